use std::path::PathBuf;

use pattern_detector::DetectorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open input {path}: {source}")]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config error in {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("line {line}: cannot parse a token from '{text}'")]
    InvalidToken { line: u64, text: String },
    #[error("invalid extract pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
