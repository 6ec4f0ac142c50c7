//! API Server
//!
//! Router assembly, middleware stack and the serve loop.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::{
    config::{LoggingConfig, NumeritoConfig, ServerConfig},
    errors::NumeritoResult,
};
use std::{sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured filter.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    if let Err(e) = installed {
        eprintln!("tracing subscriber already installed: {e}");
    }
}

/// Build the application with its middleware stack
pub fn build_app(state: Arc<AppState>, config: &ServerConfig) -> axum::Router {
    create_router(state)
        // Request ID middleware (first for tracing)
        .layer(axum::middleware::from_fn(request_id_middleware))
        // CORS layer (before timeout to handle preflight)
        .layer(create_cors_layer(&config.allowed_origins))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        // Tracing layer (last for complete request tracing)
        .layer(TraceLayer::new_for_http())
}

pub struct ApiServer {
    config: NumeritoConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: NumeritoConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn run(self) -> NumeritoResult<()> {
        let app = build_app(Arc::clone(&self.state), &self.config.server);
        let addr = self.config.server.bind_address();

        info!("🎯 Starting Numerito Game API");
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
        info!("✅ Listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!(
            "🛑 API Server stopped gracefully ({} games still in memory)",
            self.state.registry.active_count()
        );
        Ok(())
    }

    fn log_server_info(&self) {
        let server = &self.config.server;
        let scores = &self.config.scores;
        info!("📋 Server Configuration:");
        info!("   CORS: {:?}", server.allowed_origins);
        info!("   Request timeout: {}s", server.request_timeout_secs);
        info!("   Score backend: {} ({})", scores.backend, scores.path.display());

        info!("📊 Available endpoints:");
        info!("   GET    /api/health               - Health check");
        info!("   POST   /api/game                 - Start a game");
        info!("   POST   /api/game/:id/guess       - Submit a guess");
        info!("   GET    /api/game/:id             - Game state");
        info!("   DELETE /api/game/:id             - Discard a game");
        info!("   POST   /api/scores               - Record a finished game");
        info!("   GET    /api/scores/top?limit=N   - Leaderboard");
        info!("   GET    /metrics                  - Prometheus metrics");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
