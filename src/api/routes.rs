//! Route Definitions

use super::{handlers::*, monitoring::metrics_handler};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        // Game lifecycle
        .route("/api/game", post(create_game_handler))
        .route(
            "/api/game/:game_id",
            get(game_state_handler).delete(delete_game_handler),
        )
        .route("/api/game/:game_id/guess", post(guess_handler))
        // Leaderboard
        .route("/api/scores", post(save_score_handler))
        .route("/api/scores/top", get(top_scores_handler))
        // Metrics endpoint for Prometheus
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
