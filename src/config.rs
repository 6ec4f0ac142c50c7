//! Configuration management for the Numerito game service
//!
//! Values come from built-in defaults, an optional TOML file and
//! `NUMERITO_*` environment variables, in that order. The result is
//! validated before it is handed out.

use crate::errors::{ConfigurationError, NumeritoResult};
use serde::{Deserialize, Serialize};
use std::{
    env,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumeritoConfig {
    pub server: ServerConfig,
    pub scores: ScoreStoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where leaderboard scores live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBackend {
    #[default]
    Memory,
    File,
}

impl FromStr for ScoreBackend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(ScoreBackend::Memory),
            "file" => Ok(ScoreBackend::File),
            _ => Err(ConfigurationError::InvalidValue {
                field: "scores.backend".to_string(),
                value: s.to_string(),
                reason: "expected 'memory' or 'file'".to_string(),
            }),
        }
    }
}

impl fmt::Display for ScoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBackend::Memory => write!(f, "memory"),
            ScoreBackend::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreStoreConfig {
    pub backend: ScoreBackend,
    pub path: PathBuf,
    pub default_top_limit: usize,
    pub max_top_limit: usize,
    pub max_player_name_len: usize,
}

impl Default for ScoreStoreConfig {
    fn default() -> Self {
        Self {
            backend: ScoreBackend::Memory,
            path: PathBuf::from("./data/scores.json"),
            default_top_limit: 10,
            max_top_limit: 100,
            max_player_name_len: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "numerito=info,tower_http=info".to_string(),
            json: false,
        }
    }
}

type EnvSource = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env: EnvSource,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env: Box::new(|key| env::var(key).ok()),
        }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the process environment as the source of overrides
    pub fn with_env_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(source);
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> NumeritoResult<NumeritoConfig> {
        let mut config = match self.config_path {
            Some(ref path) => Self::load_from_file(path)?,
            None => NumeritoConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(path: &Path) -> NumeritoResult<NumeritoConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut NumeritoConfig) -> NumeritoResult<()> {
        let var = |key: &str| (self.env)(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("NUMERITO_HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("NUMERITO_PORT") {
            config.server.port = port.trim().parse().map_err(|_| ConfigurationError::InvalidValue {
                field: "NUMERITO_PORT".to_string(),
                value: port,
                reason: "Invalid port number".to_string(),
            })?;
        }
        if let Some(origins) = var("NUMERITO_CORS_ORIGINS") {
            config.server.allowed_origins = split_origins(&origins);
        }
        if let Some(backend) = var("NUMERITO_SCORES_BACKEND") {
            config.scores.backend = backend.parse()?;
        }
        if let Some(path) = var("NUMERITO_SCORES_PATH") {
            config.scores.path = PathBuf::from(path);
        }
        if let Some(filter) = var("NUMERITO_LOG") {
            config.logging.filter = filter;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a comma separated origin list, dropping blanks
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate configuration values
pub fn validate(config: &NumeritoConfig) -> Result<(), ConfigurationError> {
    let invalid = |field: &str, value: String, reason: &str| ConfigurationError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    };

    if config.server.host.trim().is_empty() {
        return Err(invalid("server.host", String::new(), "Host cannot be empty"));
    }
    if config.server.port == 0 {
        return Err(invalid("server.port", "0".to_string(), "Port cannot be zero"));
    }
    if config.server.request_timeout_secs == 0 {
        return Err(invalid(
            "server.request_timeout_secs",
            "0".to_string(),
            "Timeout cannot be zero",
        ));
    }
    if config.server.allowed_origins.is_empty() {
        return Err(invalid(
            "server.allowed_origins",
            "[]".to_string(),
            "At least one origin is required, use \"*\" to allow any",
        ));
    }

    let scores = &config.scores;
    if scores.max_top_limit == 0 {
        return Err(invalid("scores.max_top_limit", "0".to_string(), "Limit cannot be zero"));
    }
    if scores.default_top_limit == 0 || scores.default_top_limit > scores.max_top_limit {
        return Err(invalid(
            "scores.default_top_limit",
            scores.default_top_limit.to_string(),
            "Default limit must be between 1 and max_top_limit",
        ));
    }
    if scores.max_player_name_len == 0 {
        return Err(invalid(
            "scores.max_player_name_len",
            "0".to_string(),
            "Name length cannot be zero",
        ));
    }
    if scores.backend == ScoreBackend::File && scores.path.as_os_str().is_empty() {
        return Err(invalid(
            "scores.path",
            String::new(),
            "File backend requires a path",
        ));
    }

    Ok(())
}
