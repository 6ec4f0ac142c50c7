//! API Request and Response Models
//!
//! Wire field names are camelCase.

use crate::game::ScoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Response to `POST /api/game`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    pub game_id: String,
    pub message: String,
}

/// Body of `POST /api/game/:game_id/guess`; an absent or null `guess` is
/// reported by the validator as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuessRequest {
    #[serde(default)]
    pub guess: Option<String>,
}

/// Score of one accepted guess
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    pub bien: u8,
    pub regular: u8,
    pub mal: u8,
    pub win: bool,
    pub attempt_number: u32,
    pub finished: bool,
}

impl From<&ScoreResult> for GuessResponse {
    fn from(result: &ScoreResult) -> Self {
        Self {
            bien: result.exact_count(),
            regular: result.partial_count(),
            mal: result.miss_count(),
            win: result.won(),
            attempt_number: result.attempt_number(),
            finished: result.won(),
        }
    }
}

/// Response to `GET /api/game/:game_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    pub game_id: String,
    pub attempts: u32,
    pub finished: bool,
    /// When the game was started
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/scores`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScoreRequest {
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub attempts: Option<u32>,
    pub game_id: String,
    #[serde(default)]
    pub time_seconds: u64,
}

/// Query of `GET /api/scores/top`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopScoresQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}
