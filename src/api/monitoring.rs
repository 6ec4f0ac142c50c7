//! Metrics
//!
//! Game counters exported in the Prometheus text exposition format.

use super::handlers::AppState;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Prometheus-compatible metrics registry
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    pub games_created_total: AtomicU64,
    pub games_deleted_total: AtomicU64,
    pub guesses_scored_total: AtomicU64,
    pub guesses_rejected_total: AtomicU64,
    pub games_won_total: AtomicU64,
    pub scores_saved_total: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub games_created_total: u64,
    pub games_deleted_total: u64,
    pub guesses_scored_total: u64,
    pub guesses_rejected_total: u64,
    pub games_won_total: u64,
    pub scores_saved_total: u64,
    pub active_games: u64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game_created(&self) {
        self.games_created_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_game_deleted(&self) {
        self.games_deleted_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted guess; `won` also counts a finished game
    pub fn record_guess(&self, won: bool) {
        self.guesses_scored_total.fetch_add(1, Ordering::Relaxed);
        if won {
            self.games_won_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rejected_guess(&self) {
        self.guesses_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_score_saved(&self) {
        self.scores_saved_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, active_games: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            games_created_total: self.games_created_total.load(Ordering::Relaxed),
            games_deleted_total: self.games_deleted_total.load(Ordering::Relaxed),
            guesses_scored_total: self.guesses_scored_total.load(Ordering::Relaxed),
            guesses_rejected_total: self.guesses_rejected_total.load(Ordering::Relaxed),
            games_won_total: self.games_won_total.load(Ordering::Relaxed),
            scores_saved_total: self.scores_saved_total.load(Ordering::Relaxed),
            active_games: active_games as u64,
        }
    }

    /// Generate Prometheus metrics format
    pub fn to_prometheus_format(&self, active_games: usize) -> String {
        let s = self.snapshot(active_games);
        let mut output = String::new();

        let counters = [
            ("numerito_games_created_total", "Games started", s.games_created_total),
            ("numerito_games_deleted_total", "Games deleted by clients", s.games_deleted_total),
            ("numerito_guesses_scored_total", "Guesses accepted and scored", s.guesses_scored_total),
            ("numerito_guesses_rejected_total", "Guesses rejected before scoring", s.guesses_rejected_total),
            ("numerito_games_won_total", "Games finished with a winning guess", s.games_won_total),
            ("numerito_scores_saved_total", "Leaderboard scores recorded", s.scores_saved_total),
        ];
        for (name, help, value) in counters {
            output.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n\n"
            ));
        }

        output.push_str(&format!(
            "# HELP numerito_active_games Games currently held in memory\n\
             # TYPE numerito_active_games gauge\n\
             numerito_active_games {}\n",
            s.active_games
        ));

        output
    }
}

/// Axum handler for Prometheus metrics endpoint
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .to_prometheus_format(state.registry.active_count());

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
