//! Leaderboard persistence
//!
//! Finished games may be recorded with a player name and elapsed time, and
//! read back as a ranked list: fewest attempts first, most recent first on
//! ties.

use crate::{
    config::{ScoreBackend, ScoreStoreConfig},
    errors::{NumeritoResult, ScoreStoreError},
    registry::SessionRegistry,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub const ANONYMOUS_PLAYER: &str = "Anonymous";

/// A recorded result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: u64,
    pub player_name: String,
    pub attempts: u32,
    pub time_seconds: u64,
    pub game_id: String,
    pub created_at: DateTime<Utc>,
}

/// A validated score waiting to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    player_name: String,
    attempts: u32,
    time_seconds: u64,
    game_id: String,
}

impl NewScore {
    /// Blank names become [`ANONYMOUS_PLAYER`]; long names are truncated to
    /// `max_name_len` characters.
    pub fn new(
        player_name: Option<&str>,
        attempts: u32,
        time_seconds: u64,
        game_id: &str,
        max_name_len: usize,
    ) -> Result<Self, ScoreStoreError> {
        if attempts == 0 {
            return Err(ScoreStoreError::Invalid(
                "attempts must be greater than 0".to_string(),
            ));
        }
        let game_id = game_id.trim();
        if game_id.is_empty() {
            return Err(ScoreStoreError::Invalid("game id is required".to_string()));
        }

        let player_name = match player_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.chars().take(max_name_len).collect(),
            _ => ANONYMOUS_PLAYER.to_string(),
        };

        Ok(Self {
            player_name,
            attempts,
            time_seconds,
            game_id: game_id.to_string(),
        })
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn into_score(self, id: u64) -> Score {
        Score {
            id,
            player_name: self.player_name,
            attempts: self.attempts,
            time_seconds: self.time_seconds,
            game_id: self.game_id,
            created_at: Utc::now(),
        }
    }
}

/// Storage backend for scores
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Persist a score and return it with its assigned id and timestamp.
    /// A game can be recorded only once; a second score for the same game
    /// fails with [`ScoreStoreError::AlreadyRecorded`].
    async fn save(&self, score: NewScore) -> Result<Score, ScoreStoreError>;

    /// Best `limit` scores in ranking order
    async fn top(&self, limit: usize) -> Result<Vec<Score>, ScoreStoreError>;
}

/// Sort into leaderboard order
pub fn rank(scores: &mut [Score]) {
    scores.sort_by(|a, b| {
        a.attempts
            .cmp(&b.attempts)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn ensure_not_recorded(scores: &[Score], game_id: &str) -> Result<(), ScoreStoreError> {
    if scores.iter().any(|s| s.game_id == game_id) {
        return Err(ScoreStoreError::AlreadyRecorded {
            session_id: game_id.to_string(),
        });
    }
    Ok(())
}

fn ranked_top(scores: &[Score], limit: usize) -> Vec<Score> {
    let mut ranked = scores.to_vec();
    rank(&mut ranked);
    ranked.truncate(limit);
    ranked
}

/// Process-local store; contents are lost on restart
pub struct InMemoryScoreStore {
    scores: RwLock<Vec<Score>>,
    next_id: AtomicU64,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self {
            scores: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoreRepository for InMemoryScoreStore {
    async fn save(&self, score: NewScore) -> Result<Score, ScoreStoreError> {
        let mut scores = self.scores.write().await;
        ensure_not_recorded(&scores, &score.game_id)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let score = score.into_score(id);
        scores.push(score.clone());
        Ok(score)
    }

    async fn top(&self, limit: usize) -> Result<Vec<Score>, ScoreStoreError> {
        Ok(ranked_top(&self.scores.read().await, limit))
    }
}

/// Scores kept in a JSON document on disk.
///
/// The whole document is rewritten on every save through a temporary file
/// and a rename, so a crash never leaves a half-written file behind.
pub struct JsonFileScoreStore {
    path: PathBuf,
    scores: Mutex<Vec<Score>>,
}

impl JsonFileScoreStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ScoreStoreError> {
        let path = path.as_ref().to_path_buf();
        let scores = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "score file not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), count = scores.len(), "score store opened");

        Ok(Self {
            path,
            scores: Mutex::new(scores),
        })
    }

    async fn persist(&self, scores: &[Score]) -> Result<(), ScoreStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(scores)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ScoreRepository for JsonFileScoreStore {
    async fn save(&self, score: NewScore) -> Result<Score, ScoreStoreError> {
        let mut scores = self.scores.lock().await;
        ensure_not_recorded(&scores, &score.game_id)?;

        let id = scores.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let score = score.into_score(id);

        scores.push(score.clone());
        if let Err(e) = self.persist(&scores).await {
            scores.pop();
            warn!(path = %self.path.display(), error = %e, "failed to persist score");
            return Err(e);
        }
        Ok(score)
    }

    async fn top(&self, limit: usize) -> Result<Vec<Score>, ScoreStoreError> {
        Ok(ranked_top(&self.scores.lock().await, limit))
    }
}

/// Build the repository selected by configuration
pub async fn open_repository(
    config: &ScoreStoreConfig,
) -> Result<Arc<dyn ScoreRepository>, ScoreStoreError> {
    match config.backend {
        ScoreBackend::Memory => Ok(Arc::new(InMemoryScoreStore::new())),
        ScoreBackend::File => Ok(Arc::new(JsonFileScoreStore::open(&config.path).await?)),
    }
}

/// A request to record a finished game
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    pub player_name: Option<String>,
    pub attempts: Option<u32>,
    pub time_seconds: u64,
    pub game_id: String,
}

/// Records scores for finished games and serves the ranked list
#[derive(Clone)]
pub struct Leaderboard {
    repository: Arc<dyn ScoreRepository>,
    default_limit: usize,
    max_limit: usize,
    max_name_len: usize,
}

impl Leaderboard {
    pub fn new(repository: Arc<dyn ScoreRepository>, config: &ScoreStoreConfig) -> Self {
        Self {
            repository,
            default_limit: config.default_top_limit,
            max_limit: config.max_top_limit,
            max_name_len: config.max_player_name_len,
        }
    }

    /// Record a score for a game the registry reports as finished.
    ///
    /// The stored attempt count is the session's own; a differing
    /// client-supplied count is rejected.
    pub async fn record(
        &self,
        registry: &SessionRegistry,
        submission: ScoreSubmission,
    ) -> NumeritoResult<Score> {
        let game_id = submission.game_id.trim();
        if game_id.is_empty() {
            return Err(ScoreStoreError::Invalid("game id is required".to_string()).into());
        }

        let state = registry.session_state(game_id)?;
        if !state.finished {
            return Err(ScoreStoreError::GameNotFinished {
                session_id: game_id.to_string(),
            }
            .into());
        }
        if let Some(claimed) = submission.attempts {
            if claimed != state.attempts {
                return Err(ScoreStoreError::Invalid(format!(
                    "attempts {} do not match the game's {} attempts",
                    claimed, state.attempts
                ))
                .into());
            }
        }

        let new_score = NewScore::new(
            submission.player_name.as_deref(),
            state.attempts,
            submission.time_seconds,
            game_id,
            self.max_name_len,
        )?;
        let score = self.repository.save(new_score).await?;
        info!(
            game_id,
            player = %score.player_name,
            attempts = score.attempts,
            "score recorded"
        );
        Ok(score)
    }

    /// Ranked scores. Absent or non-positive limits use the default; large
    /// limits are capped.
    pub async fn top(&self, requested: Option<i64>) -> Result<Vec<Score>, ScoreStoreError> {
        self.repository.top(self.clamp_limit(requested)).await
    }

    pub fn clamp_limit(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n >= 1 => (n as u64).min(self.max_limit as u64) as usize,
            _ => self.default_limit,
        }
    }
}
