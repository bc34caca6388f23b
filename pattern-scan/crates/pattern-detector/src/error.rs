use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectorError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("max_period must be at least 1, got {max_period}")]
    InvalidMaxPeriod { max_period: usize },
}
