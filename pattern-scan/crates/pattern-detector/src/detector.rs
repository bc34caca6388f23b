//! Streaming periodic-pattern detector.
//!
//! Each call to `PatternDetector::step` feeds one token. The detector keeps
//! the last `max_period + 1` tokens in a pushing queue and one
//! `StreakRegister` per candidate period. A period is *confirmed* once the
//! token `p` steps back has matched the new token on each of the last `p`
//! steps.
//!
//! ## Transitions
//!
//! | previous | new | state |
//! |----------|-----|-------|
//! | 0 | 0 | `NoPattern` |
//! | 0 | p | `PatternStarted` |
//! | p | 0 | `PatternStopped` |
//! | p | p | `PatternUnchanged` |
//! | p | q | `PatternChangedSizes` |
//!
//! ## Period selection
//!
//! The smallest confirmed period wins. With `prefer_larger_period`, the
//! previously reported period is kept while it stays confirmed, even if a
//! smaller period is also confirmed. Only the previous period is considered;
//! other larger confirmed periods are never searched.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DetectorError, Result};
use crate::pushing_queue::{MixedPushingQueue, PushingQueue};
use crate::streak::StreakRegister;

// ============ Pattern State ============

/// Label emitted by each step, derived from the previous and new period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternState {
    #[default]
    NoPattern,
    PatternStarted,
    PatternStopped,
    PatternUnchanged,
    PatternChangedSizes,
}

impl PatternState {
    /// Every label, in declaration order.
    pub const ALL: [PatternState; 5] = [
        PatternState::NoPattern,
        PatternState::PatternStarted,
        PatternState::PatternStopped,
        PatternState::PatternUnchanged,
        PatternState::PatternChangedSizes,
    ];

    /// Label for a step that moved from `previous_period` to `new_period`
    /// (0 meaning no pattern).
    pub fn from_transition(previous_period: usize, new_period: usize) -> Self {
        match (previous_period, new_period) {
            (0, 0) => PatternState::NoPattern,
            (0, _) => PatternState::PatternStarted,
            (_, 0) => PatternState::PatternStopped,
            (previous, new) if previous == new => PatternState::PatternUnchanged,
            _ => PatternState::PatternChangedSizes,
        }
    }

    /// Whether the reported period differs from the previous step.
    pub fn is_change(self) -> bool {
        matches!(
            self,
            PatternState::PatternStarted
                | PatternState::PatternStopped
                | PatternState::PatternChangedSizes
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PatternState::NoPattern => "NO_PATTERN",
            PatternState::PatternStarted => "PATTERN_STARTED",
            PatternState::PatternStopped => "PATTERN_STOPPED",
            PatternState::PatternUnchanged => "PATTERN_UNCHANGED",
            PatternState::PatternChangedSizes => "PATTERN_CHANGED_SIZES",
        }
    }
}

impl fmt::Display for PatternState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Choose the period to report from this step's confirmations.
///
/// `confirmed[i]` tells whether period `i + 1` is confirmed. Returns 0 when
/// nothing is confirmed.
pub fn select_period(confirmed: &[bool], previous_period: usize, prefer_larger_period: bool) -> usize {
    let smallest = confirmed
        .iter()
        .position(|&is_confirmed| is_confirmed)
        .map_or(0, |index| index + 1);

    if prefer_larger_period && previous_period > smallest {
        let previous_still_confirmed = confirmed
            .get(previous_period - 1)
            .copied()
            .unwrap_or(false);
        if previous_still_confirmed {
            return previous_period;
        }
    }

    smallest
}

// ============ Detector ============

/// Looks for repeating cycles of up to `max_period` tokens in a token stream.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    max_period: usize,
    prefer_larger_period: bool,
    /// Last `max_period + 1` tokens, most recent first; `None` until filled
    window: MixedPushingQueue<Option<u64>>,
    /// Index `i` tracks period `i + 1`
    streaks: Vec<StreakRegister>,
    /// Scratch confirmation set, rebuilt every step
    confirmed: Vec<bool>,
    period: usize,
    state: PatternState,
}

impl PatternDetector {
    /// Create a detector for periods `1..=max_period`.
    ///
    /// Fails if `max_period` is 0.
    pub fn new(max_period: usize, prefer_larger_period: bool) -> Result<Self> {
        if max_period < 1 {
            return Err(DetectorError::InvalidMaxPeriod { max_period });
        }

        Ok(Self {
            max_period,
            prefer_larger_period,
            window: Self::empty_window(max_period),
            streaks: (1..=max_period).map(StreakRegister::new).collect(),
            confirmed: vec![false; max_period],
            period: 0,
            state: PatternState::NoPattern,
        })
    }

    fn empty_window(max_period: usize) -> MixedPushingQueue<Option<u64>> {
        let mut window = MixedPushingQueue::new(max_period + 1);
        for _ in 0..window.capacity() {
            window.insert(None);
        }
        window
    }

    /// Feed the next token and return the resulting transition.
    pub fn step(&mut self, token: u64) -> PatternState {
        self.window.insert(Some(token));

        // Position 0 is the token just inserted; position p is p steps back
        let lagged = self.window.iter().skip(1);
        for ((streak, confirmed), previous) in self
            .streaks
            .iter_mut()
            .zip(self.confirmed.iter_mut())
            .zip(lagged)
        {
            if *previous == Some(token) {
                streak.record_match();
            } else {
                streak.clear();
            }
            *confirmed = streak.is_confirmed();
        }

        let previous_period = self.period;
        let new_period = select_period(&self.confirmed, previous_period, self.prefer_larger_period);
        let state = PatternState::from_transition(previous_period, new_period);

        if state.is_change() {
            debug!(
                state = %state,
                previous_period,
                new_period,
                "pattern transition"
            );
        }

        self.period = new_period;
        self.state = state;
        state
    }

    /// Currently reported period, 0 if there is no pattern.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Label returned by the most recent step.
    pub fn state(&self) -> PatternState {
        self.state
    }

    pub fn max_period(&self) -> usize {
        self.max_period
    }

    pub fn prefer_larger_period(&self) -> bool {
        self.prefer_larger_period
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        self.window = Self::empty_window(self.max_period);
        self.streaks.iter_mut().for_each(StreakRegister::clear);
        self.confirmed.iter_mut().for_each(|c| *c = false);
        self.period = 0;
        self.state = PatternState::NoPattern;
    }
}

impl fmt::Display for PatternDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternDetector [streaks=[")?;
        for (index, streak) in self.streaks.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", streak)?;
        }
        write!(f, "], window=[")?;
        for (index, token) in self.window.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match token {
                Some(token) => write!(f, "{}", token)?,
                None => write!(f, "-")?,
            }
        }
        write!(f, "], period={}]", self.period)
    }
}
