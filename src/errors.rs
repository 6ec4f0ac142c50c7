//! Error types for the Numerito game service
//!
//! Every failure is a recoverable outcome reported to the immediate caller.
//! Nothing in the core panics on bad input.

/// Why a raw guess was rejected by the validator.
///
/// Variants are listed in the order the rules are checked; the first rule
/// that fails decides which variant is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGuess {
    #[error("guess must be present")]
    Missing,

    #[error("guess must have exactly 4 digits, received {received}")]
    WrongLength { received: usize },

    #[error("guess must contain digits only, invalid character: '{character}'")]
    NonDigit { character: char },

    #[error("first digit cannot be zero")]
    LeadingZero,

    #[error("digits must be distinct, repeated digit: '{digit}'")]
    RepeatedDigit { digit: char },
}

impl InvalidGuess {
    /// Stable machine-readable code for the violated rule
    pub fn rule(&self) -> &'static str {
        match self {
            InvalidGuess::Missing => "missing",
            InvalidGuess::WrongLength { .. } => "length",
            InvalidGuess::NonDigit { .. } => "digits_only",
            InvalidGuess::LeadingZero => "leading_zero",
            InvalidGuess::RepeatedDigit { .. } => "distinct_digits",
        }
    }
}

/// Errors produced by game sessions and the session registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    InvalidGuess(#[from] InvalidGuess),

    #[error("game has already finished")]
    GameAlreadyFinished,

    #[error("game {session_id} not found")]
    SessionNotFound { session_id: String },

    #[error("no free game id after {attempts} attempts")]
    IdAllocationFailed { attempts: u32 },

    #[error(transparent)]
    ScoreInvariant(#[from] ScoreInvariantViolated),
}

/// A score result could not be built because its counts are inconsistent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("score invariant violated: exact={exact} partial={partial} miss={miss} attempt={attempt}")]
pub struct ScoreInvariantViolated {
    pub exact: u8,
    pub partial: u8,
    pub miss: u8,
    pub attempt: u32,
}

/// Leaderboard persistence errors
#[derive(Debug, thiserror::Error)]
pub enum ScoreStoreError {
    #[error("invalid score: {0}")]
    Invalid(String),

    #[error("game {session_id} is not finished")]
    GameNotFinished { session_id: String },

    #[error("a score for game {session_id} has already been recorded")]
    AlreadyRecorded { session_id: String },

    #[error("score storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("score storage is corrupted: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Root error type for all Numerito operations
#[derive(Debug, thiserror::Error)]
pub enum NumeritoError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Score store error: {0}")]
    Scores(#[from] ScoreStoreError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<InvalidGuess> for NumeritoError {
    fn from(e: InvalidGuess) -> Self {
        NumeritoError::Game(GameError::InvalidGuess(e))
    }
}

pub type NumeritoResult<T> = Result<T, NumeritoError>;
