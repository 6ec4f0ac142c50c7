//! One game: a secret, an attempt counter and a terminal `Finished` state.

use super::{scorer, validator, ScoreResult, Secret, SecretGenerator};
use crate::errors::GameError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

/// Lifecycle of a session. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Finished,
}

#[derive(Debug)]
pub struct GameSession {
    secret: Secret,
    attempts: u32,
    status: SessionStatus,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// Start a game with a freshly generated secret
    pub fn new() -> Self {
        Self::with_secret(SecretGenerator::generate())
    }

    /// Start a game with a known secret
    pub fn with_secret(secret: Secret) -> Self {
        Self {
            secret,
            attempts: 0,
            status: SessionStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Validate and score a guess.
    ///
    /// Rejected guesses (invalid format, or any guess after a win) leave the
    /// attempt counter untouched.
    pub fn submit_guess<'a>(
        &mut self,
        raw: impl Into<Option<&'a str>>,
    ) -> Result<ScoreResult, GameError> {
        if self.status == SessionStatus::Finished {
            return Err(GameError::GameAlreadyFinished);
        }

        let guess = validator::validate(raw)?;
        self.attempts += 1;

        let tally = scorer::score(guess.digits(), self.secret.digits());
        let result = ScoreResult::new(tally, self.attempts)?;

        trace!(
            attempt = self.attempts,
            exact = result.exact_count(),
            partial = result.partial_count(),
            "guess scored"
        );

        if result.won() {
            self.status = SessionStatus::Finished;
        }

        Ok(result)
    }

    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[cfg(test)]
    pub(crate) fn secret(&self) -> &Secret {
        &self.secret
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InvalidGuess;

    fn session(secret: &str) -> GameSession {
        GameSession::with_secret(Secret::parse(secret).unwrap())
    }

    #[test]
    fn test_new_session_has_valid_secret() {
        let s = GameSession::new();
        let digits = s.secret().digits();
        assert_ne!(digits[0], 0);
        assert_eq!(s.attempt_count(), 0);
        assert!(!s.is_finished());
    }

    #[test]
    fn test_perfect_guess_wins_on_first_attempt() {
        let mut s = session("1234");
        let r = s.submit_guess("1234").unwrap();
        assert_eq!(
            (r.exact_count(), r.partial_count(), r.miss_count()),
            (4, 0, 0)
        );
        assert!(r.won());
        assert_eq!(r.attempt_number(), 1);
        assert!(s.is_finished());
        assert_eq!(s.status(), SessionStatus::Finished);
    }

    #[test]
    fn test_guess_after_win_is_rejected_without_counting() {
        let mut s = session("1234");
        s.submit_guess("1234").unwrap();
        assert_eq!(s.submit_guess("5678"), Err(GameError::GameAlreadyFinished));
        // even an invalid guess reports the finished state first
        assert_eq!(s.submit_guess("12"), Err(GameError::GameAlreadyFinished));
        assert_eq!(s.attempt_count(), 1);
    }

    #[test]
    fn test_invalid_guess_does_not_count() {
        let mut s = session("1234");
        assert_eq!(
            s.submit_guess(None::<&str>),
            Err(GameError::InvalidGuess(InvalidGuess::Missing))
        );
        assert_eq!(
            s.submit_guess("0123"),
            Err(GameError::InvalidGuess(InvalidGuess::LeadingZero))
        );
        assert_eq!(s.attempt_count(), 0);

        let r = s.submit_guess("5678").unwrap();
        assert_eq!(r.attempt_number(), 1);
    }

    #[test]
    fn test_attempt_numbers_increase() {
        let mut s = session("1234");
        assert_eq!(s.submit_guess("5678").unwrap().attempt_number(), 1);
        assert_eq!(s.submit_guess("9012").unwrap().attempt_number(), 2);
        let last = s.submit_guess("1234").unwrap();
        assert_eq!(last.attempt_number(), 3);
        assert!(last.won());
        assert_eq!(s.attempt_count(), 3);
    }

    #[test]
    fn test_secret_with_inner_zero() {
        let mut s = session("1023");
        assert!(s.submit_guess("1023").unwrap().won());
    }
}
