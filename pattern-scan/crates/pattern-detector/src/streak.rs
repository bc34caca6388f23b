//! Per-period match history.
//!
//! A `StreakRegister` for period `p` is a `p`-bit FIFO of "did the lag-`p`
//! comparison match at this step". Bit 0 is the oldest retained entry and bit
//! `p - 1` the newest. A match shifts every bit one position toward bit 0 and
//! sets the newest bit; a mismatch clears the whole register.
//!
//! ```text
//!   p = 3, bits rendered oldest..newest
//!   match    => 001
//!   match    => 011
//!   match    => 111   (confirmed)
//!   mismatch => 000
//! ```
//!
//! Because a mismatch wipes everything, bit 0 is set exactly when the last `p`
//! steps all matched. That is the confirmation test.

use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakRegister {
    words: Vec<u64>,
    period: usize,
}

impl StreakRegister {
    /// Create an empty register for `period` (must be at least 1).
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "streak register period must be positive");
        Self {
            words: vec![0; period.div_ceil(WORD_BITS).max(1)],
            period,
        }
    }

    /// Width of the register, equal to the period it tracks.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Record a successful match: drop the oldest bit and set the newest.
    pub fn record_match(&mut self) {
        let last = self.words.len() - 1;
        for i in 0..last {
            self.words[i] = (self.words[i] >> 1) | (self.words[i + 1] << (WORD_BITS - 1));
        }
        self.words[last] >>= 1;
        self.set(self.period - 1);
    }

    /// Forget the whole history.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    /// Whether the lag has matched on each of the last `period` steps.
    pub fn is_confirmed(&self) -> bool {
        self.words[0] & 1 == 1
    }

    /// Bit at `position` (0 = oldest, `period - 1` = newest).
    pub fn get(&self, position: usize) -> bool {
        if position >= self.period {
            return false;
        }
        (self.words[position / WORD_BITS] >> (position % WORD_BITS)) & 1 == 1
    }

    /// Length of the current streak, capped at the period.
    pub fn streak_len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    fn set(&mut self, position: usize) {
        self.words[position / WORD_BITS] |= 1u64 << (position % WORD_BITS);
    }
}

impl fmt::Display for StreakRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in 0..self.period {
            f.write_str(if self.get(position) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
