//! Numerito HTTP API
//!
//! JSON endpoints for playing games and recording leaderboard scores.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod monitoring;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::{build_app, init_tracing, ApiServer};
