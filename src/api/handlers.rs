//! Request Handlers

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
    monitoring::MetricsRegistry,
};
use crate::{
    errors::GameError,
    registry::SessionRegistry,
    scores::{Leaderboard, Score, ScoreSubmission},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::debug;

pub const SERVICE_NAME: &str = "numerito-game-api";

/// Shared application state
pub struct AppState {
    pub registry: SessionRegistry,
    pub leaderboard: Leaderboard,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(registry: SessionRegistry, leaderboard: Leaderboard) -> Self {
        Self {
            registry,
            leaderboard,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }
}

/// GET /api/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

/// POST /api/game
pub async fn create_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CreateGameResponse>), ApiError> {
    let game_id = state
        .registry
        .create_session()
        .map_err(|e| ApiError::from_game(request_id.0, e))?;
    state.metrics.record_game_created();

    Ok((
        StatusCode::CREATED,
        Json(CreateGameResponse {
            game_id,
            message: "Game created successfully".to_string(),
        }),
    ))
}

/// POST /api/game/:game_id/guess
pub async fn guess_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GuessResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(request_id.0.clone(), e))?;

    match state.registry.submit_guess(&game_id, request.guess.as_deref()) {
        Ok(result) => {
            state.metrics.record_guess(result.won());
            Ok(Json(GuessResponse::from(&result)))
        }
        Err(e) => {
            if matches!(e, GameError::InvalidGuess(_) | GameError::GameAlreadyFinished) {
                state.metrics.record_rejected_guess();
            }
            Err(ApiError::from_game(request_id.0, e))
        }
    }
}

/// GET /api/game/:game_id
pub async fn game_state_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let session = state
        .registry
        .session_state(&game_id)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;

    Ok(Json(GameStateResponse {
        game_id,
        attempts: session.attempts,
        finished: session.finished,
        created_at: session.created_at,
    }))
}

/// DELETE /api/game/:game_id
pub async fn delete_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.registry.remove_session(&game_id) {
        state.metrics.record_game_deleted();
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::from_game(
            request_id.0,
            GameError::SessionNotFound { session_id: game_id },
        ))
    }
}

/// POST /api/scores
pub async fn save_score_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveScoreRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Score>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(request_id.0.clone(), e))?;

    let submission = ScoreSubmission {
        player_name: request.player_name,
        attempts: request.attempts,
        time_seconds: request.time_seconds,
        game_id: request.game_id,
    };
    let score = state
        .leaderboard
        .record(&state.registry, submission)
        .await
        .map_err(|e| ApiError::from_numerito(request_id.0, e))?;

    state.metrics.record_score_saved();
    Ok((StatusCode::CREATED, Json(score)))
}

/// GET /api/scores/top?limit={n}
pub async fn top_scores_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<TopScoresQuery>, QueryRejection>,
) -> Result<Json<Vec<Score>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(request_id.0.clone(), e.body_text()))?;

    let scores = state
        .leaderboard
        .top(query.limit)
        .await
        .map_err(|e| ApiError::from_scores(request_id.0, e))?;

    debug!(requested = ?query.limit, returned = scores.len(), "top scores served");
    Ok(Json(scores))
}
