//! Pattern Detector - streaming detection of periodic token sequences
//!
//! This crate provides:
//! - Fixed-capacity "pushing queues" that keep the last N inserted values
//! - Per-period streak registers that confirm a lag has held long enough
//! - A `PatternDetector` state machine that reports when a cycle starts,
//!   stops, changes size or persists
//!
//! ```
//! use pattern_detector::{PatternDetector, PatternState};
//!
//! let mut detector = PatternDetector::new(3, false).unwrap();
//! let states: Vec<PatternState> = [1, 2, 3, 1, 2, 3]
//!     .into_iter()
//!     .map(|token| detector.step(token))
//!     .collect();
//!
//! assert_eq!(states[5], PatternState::PatternStarted);
//! assert_eq!(detector.period(), 3);
//! ```

pub mod detector;
pub mod error;
pub mod pushing_queue;
pub mod streak;

pub use detector::{select_period, PatternDetector, PatternState};
pub use error::{DetectorError, Result};
pub use pushing_queue::{
    ArrayPushingQueue, LinkedPushingQueue, MixedPushingQueue, PushingQueue, LINKED_THRESHOLD,
};
pub use streak::StreakRegister;
