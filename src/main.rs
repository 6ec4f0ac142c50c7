//! Numerito API Server Binary

use clap::Parser;
use numerito::{
    api::{init_tracing, ApiServer, AppState},
    config::{self, split_origins, ConfigLoader, ScoreBackend},
    scores::{open_repository, Leaderboard},
    NumeritoResult, SessionRegistry,
};
use std::{path::PathBuf, sync::Arc};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "numerito")]
#[command(about = "BIEN / REGULAR / MAL number guessing game server", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Score storage backend (memory or file)
    #[arg(long)]
    scores_backend: Option<ScoreBackend>,

    /// Score file used by the file backend
    #[arg(long)]
    scores_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("fatal: {}", e);
        eprintln!("numerito: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> NumeritoResult<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    // Command line flags win over file and environment
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(origins) = args.cors_origins {
        config.server.allowed_origins = split_origins(&origins);
    }
    if let Some(backend) = args.scores_backend {
        config.scores.backend = backend;
    }
    if let Some(path) = args.scores_path {
        config.scores.path = path;
    }
    config::validate(&config)?;

    init_tracing(&config.logging);

    let repository = open_repository(&config.scores).await?;
    let leaderboard = Leaderboard::new(repository, &config.scores);
    let state = Arc::new(AppState::new(SessionRegistry::new(), leaderboard));

    ApiServer::new(config, state).run().await
}
