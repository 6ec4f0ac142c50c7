//! BIEN / REGULAR / MAL scoring
//!
//! Two passes. The first counts exact positional matches and consumes those
//! positions on both sides. The second walks the remaining guess positions in
//! order and pairs each with the first unconsumed secret position holding the
//! same digit. A secret position is consumed at most once, so repeated digits
//! in unvalidated input are never double counted.

use super::{Digits, DIGIT_COUNT};
use crate::errors::ScoreInvariantViolated;
use serde::Serialize;

/// Exact and partial match counts for one comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub exact: u8,
    pub partial: u8,
}

impl Tally {
    /// Digits with no matching secret digit, derived from the other counts
    pub fn miss(&self) -> u8 {
        (DIGIT_COUNT as u8).saturating_sub(self.exact.saturating_add(self.partial))
    }
}

/// Compare a guess against a secret.
///
/// Callable with any digit arrays; distinctness is not assumed.
pub fn score(guess: &Digits, secret: &Digits) -> Tally {
    let mut tally = Tally::default();
    let mut guess_used = [false; DIGIT_COUNT];
    let mut secret_used = [false; DIGIT_COUNT];

    for i in 0..DIGIT_COUNT {
        if guess[i] == secret[i] {
            tally.exact += 1;
            guess_used[i] = true;
            secret_used[i] = true;
        }
    }

    for i in 0..DIGIT_COUNT {
        if guess_used[i] {
            continue;
        }
        let first_match = (0..DIGIT_COUNT).find(|&j| !secret_used[j] && secret[j] == guess[i]);
        if let Some(j) = first_match {
            tally.partial += 1;
            secret_used[j] = true;
        }
    }

    tally
}

/// Outcome of one scored guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    exact_count: u8,
    partial_count: u8,
    miss_count: u8,
    won: bool,
    attempt_number: u32,
}

impl ScoreResult {
    /// Build a result, rejecting counts that exceed the digit count or a
    /// zero attempt number
    pub fn new(tally: Tally, attempt_number: u32) -> Result<Self, ScoreInvariantViolated> {
        let total = tally.exact as usize + tally.partial as usize;
        if total > DIGIT_COUNT || attempt_number == 0 {
            return Err(ScoreInvariantViolated {
                exact: tally.exact,
                partial: tally.partial,
                miss: DIGIT_COUNT.saturating_sub(total) as u8,
                attempt: attempt_number,
            });
        }

        Ok(Self {
            exact_count: tally.exact,
            partial_count: tally.partial,
            miss_count: tally.miss(),
            won: tally.exact as usize == DIGIT_COUNT,
            attempt_number,
        })
    }

    pub fn exact_count(&self) -> u8 {
        self.exact_count
    }

    pub fn partial_count(&self) -> u8 {
        self.partial_count
    }

    pub fn miss_count(&self) -> u8 {
        self.miss_count
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn attempt_number(&self) -> u32 {
        self.attempt_number
    }
}
