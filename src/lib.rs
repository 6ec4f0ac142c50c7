//! Numerito - BIEN / REGULAR / MAL number guessing game
//!
//! A player tries to find a hidden four-digit number with distinct digits.
//! Every guess is answered with how many digits sit in the right place
//! (BIEN), how many are present elsewhere (REGULAR) and how many are absent
//! (MAL).
//!
//! The game core lives in [`game`]; [`registry`] keeps concurrent sessions,
//! [`scores`] keeps the leaderboard and [`api`] exposes both over HTTP.

pub mod api;
pub mod config;
pub mod errors;
pub mod game;
pub mod registry;
pub mod scores;

pub use config::{ConfigLoader, NumeritoConfig};
pub use errors::{GameError, InvalidGuess, NumeritoError, NumeritoResult};
pub use game::{GameSession, ScoreResult, Secret, SecretGenerator};
pub use registry::{SessionRegistry, SessionState};
pub use scores::{Leaderboard, Score, ScoreRepository};
