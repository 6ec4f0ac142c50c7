//! Game core: secret generation, guess validation, scoring and the
//! per-session state machine.

pub mod scorer;
pub mod secret;
pub mod session;
pub mod validator;

pub use scorer::{score, ScoreResult, Tally};
pub use secret::{Secret, SecretGenerator};
pub use session::{GameSession, SessionStatus};
pub use validator::{validate, Guess};

/// Number of digits in every secret and every guess
pub const DIGIT_COUNT: usize = 4;

/// Digit values (0-9), one per position
pub type Digits = [u8; DIGIT_COUNT];
