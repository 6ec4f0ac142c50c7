//! Guess format rules
//!
//! Rules are checked in a fixed order and the first failing rule is the one
//! reported: presence, length, digits only, non-zero first digit, distinct
//! digits.

use super::{Digits, DIGIT_COUNT};
use crate::errors::InvalidGuess;

/// A guess that passed every format rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guess {
    digits: Digits,
}

impl Guess {
    pub fn digits(&self) -> &Digits {
        &self.digits
    }
}

/// Check a raw guess against the format rules.
///
/// Accepts either a `&str` or an `Option<&str>`; `None` models an absent
/// guess and fails with [`InvalidGuess::Missing`].
pub fn validate<'a>(input: impl Into<Option<&'a str>>) -> Result<Guess, InvalidGuess> {
    let input = input.into().ok_or(InvalidGuess::Missing)?;

    let received = input.chars().count();
    if received != DIGIT_COUNT {
        return Err(InvalidGuess::WrongLength { received });
    }

    let mut digits: Digits = [0; DIGIT_COUNT];
    for (slot, character) in digits.iter_mut().zip(input.chars()) {
        if !character.is_ascii_digit() {
            return Err(InvalidGuess::NonDigit { character });
        }
        *slot = character as u8 - b'0';
    }

    if digits[0] == 0 {
        return Err(InvalidGuess::LeadingZero);
    }

    let mut seen = [false; 10];
    for &digit in &digits {
        if seen[digit as usize] {
            return Err(InvalidGuess::RepeatedDigit {
                digit: char::from(b'0' + digit),
            });
        }
        seen[digit as usize] = true;
    }

    Ok(Guess { digits })
}
