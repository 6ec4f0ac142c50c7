use super::{validator, Digits, DIGIT_COUNT};
use crate::errors::InvalidGuess;
use rand::{rngs::OsRng, seq::SliceRandom, Rng};
use std::{fmt, str::FromStr};

/// The hidden target of one game.
///
/// Always four pairwise-distinct digits with a non-zero first digit.
/// `Debug` is redacted so a secret never leaks through logs by accident.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Secret {
    digits: Digits,
}

impl Secret {
    /// Build a secret from explicit text, applying the guess format rules
    pub fn parse(text: &str) -> Result<Self, InvalidGuess> {
        let guess = validator::validate(text)?;
        Ok(Self {
            digits: *guess.digits(),
        })
    }

    pub fn digits(&self) -> &Digits {
        &self.digits
    }

    /// Plain-text rendering, for tests and debugging only
    pub fn reveal(&self) -> String {
        self.digits
            .iter()
            .map(|d| char::from(b'0' + d))
            .collect()
    }
}

impl FromStr for Secret {
    type Err = InvalidGuess;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Produces uniformly random secrets
pub struct SecretGenerator;

impl SecretGenerator {
    /// Generate a secret from the operating system's randomness source
    pub fn generate() -> Secret {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a secret from a caller-supplied source.
    ///
    /// First digit is drawn from 1..=9. The remaining nine digits are
    /// shuffled and the first three fill positions two to four.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Secret {
        let first = rng.gen_range(1..=9u8);

        let mut pool: Vec<u8> = (0..=9u8).filter(|&d| d != first).collect();
        pool.shuffle(rng);

        let mut digits: Digits = [0; DIGIT_COUNT];
        digits[0] = first;
        digits[1..].copy_from_slice(&pool[..DIGIT_COUNT - 1]);

        Secret { digits }
    }
}
