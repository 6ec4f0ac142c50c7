//! Session Registry
//!
//! Concurrent map of session id -> game session. Lookups go through the
//! sharded `DashMap`; each session sits behind its own mutex so guesses on
//! one game never wait on another game. The shard guard is always released
//! before a session lock is taken.

use crate::{
    errors::GameError,
    game::{GameSession, ScoreResult, Secret},
};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Hands out opaque identifiers for new sessions
pub trait SessionIdAllocator: Send + Sync {
    fn allocate(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl SessionIdAllocator for UuidAllocator {
    fn allocate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Observable state of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub attempts: u32,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
}

type SharedSession = Arc<Mutex<GameSession>>;

/// Fresh ids tried before giving up on creating a session
pub const MAX_ID_ATTEMPTS: u32 = 16;

pub struct SessionRegistry {
    sessions: DashMap<String, SharedSession>,
    allocator: Box<dyn SessionIdAllocator>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_allocator(UuidAllocator)
    }

    pub fn with_allocator(allocator: impl SessionIdAllocator + 'static) -> Self {
        Self {
            sessions: DashMap::new(),
            allocator: Box::new(allocator),
        }
    }

    /// Start a new game with a random secret and return its handle
    pub fn create_session(&self) -> Result<String, GameError> {
        self.insert_session(GameSession::new())
    }

    /// Start a new game with a known secret
    pub fn create_session_with_secret(&self, secret: Secret) -> Result<String, GameError> {
        self.insert_session(GameSession::with_secret(secret))
    }

    fn insert_session(&self, session: GameSession) -> Result<String, GameError> {
        let shared = Arc::new(Mutex::new(session));
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.allocator.allocate();
            match self.sessions.entry(id) {
                Entry::Vacant(slot) => {
                    let id = slot.key().clone();
                    slot.insert(shared);
                    info!(session_id = %id, "game session created");
                    return Ok(id);
                }
                Entry::Occupied(taken) => {
                    debug!(session_id = %taken.key(), "allocated id already in use, retrying");
                }
            }
        }

        warn!(attempts = MAX_ID_ATTEMPTS, "could not allocate a free game id");
        Err(GameError::IdAllocationFailed {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn lookup(&self, session_id: &str) -> Result<SharedSession, GameError> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| GameError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    /// Validate and score a guess against one session
    pub fn submit_guess<'a>(
        &self,
        session_id: &str,
        raw: impl Into<Option<&'a str>>,
    ) -> Result<ScoreResult, GameError> {
        let session = self.lookup(session_id)?;
        let mut session = session.lock();

        match session.submit_guess(raw) {
            Ok(result) => {
                debug!(
                    session_id,
                    attempt = result.attempt_number(),
                    exact = result.exact_count(),
                    partial = result.partial_count(),
                    "guess scored"
                );
                if result.won() {
                    info!(session_id, attempts = result.attempt_number(), "game won");
                }
                Ok(result)
            }
            Err(e) => {
                debug!(session_id, error = %e, "guess rejected");
                Err(e)
            }
        }
    }

    pub fn session_state(&self, session_id: &str) -> Result<SessionState, GameError> {
        let session = self.lookup(session_id)?;
        let session = session.lock();
        Ok(SessionState {
            attempts: session.attempt_count(),
            finished: session.is_finished(),
            created_at: session.created_at(),
        })
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!(session_id, "game session removed");
        }
        removed
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Yields "dup" twice before switching to numbered ids
    struct CollidingAllocator {
        calls: AtomicUsize,
    }

    impl SessionIdAllocator for CollidingAllocator {
        fn allocate(&self) -> String {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                "dup".to_string()
            } else {
                format!("id-{n}")
            }
        }
    }

    struct FixedAllocator;

    impl SessionIdAllocator for FixedAllocator {
        fn allocate(&self) -> String {
            "same".to_string()
        }
    }

    fn secret(text: &str) -> Secret {
        Secret::parse(text).unwrap()
    }

    #[test]
    fn test_create_and_query_session() {
        let registry = SessionRegistry::new();
        let id = registry.create_session().unwrap();
        assert!(registry.contains(&id));
        assert_eq!(registry.active_count(), 1);

        let state = registry.session_state(&id).unwrap();
        assert_eq!(state.attempts, 0);
        assert!(!state.finished);
    }

    #[test]
    fn test_unknown_session_is_reported() {
        let registry = SessionRegistry::new();
        let expected = GameError::SessionNotFound {
            session_id: "nope".to_string(),
        };
        assert_eq!(registry.submit_guess("nope", "1234"), Err(expected.clone()));
        assert_eq!(registry.session_state("nope"), Err(expected));
    }

    #[test]
    fn test_colliding_allocator_retries() {
        let registry = SessionRegistry::with_allocator(CollidingAllocator {
            calls: AtomicUsize::new(0),
        });
        let first = registry.create_session().unwrap();
        let second = registry.create_session().unwrap();
        assert_eq!(first, "dup");
        assert_eq!(second, "id-2");
        assert_eq!(registry.active_count(), 2);
    }

    #[test]
    fn test_exhausted_allocator_reports_error() {
        let registry = SessionRegistry::with_allocator(FixedAllocator);
        assert_eq!(registry.create_session().unwrap(), "same");

        assert_eq!(
            registry.create_session(),
            Err(GameError::IdAllocationFailed {
                attempts: MAX_ID_ATTEMPTS
            })
        );
        // the existing session is left untouched
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.session_state("same").unwrap().attempts, 0);
    }

    #[test]
    fn test_guess_flow_through_registry() {
        let registry = SessionRegistry::new();
        let id = registry.create_session_with_secret(secret("1234")).unwrap();

        let r = registry.submit_guess(&id, "1243").unwrap();
        assert_eq!((r.exact_count(), r.partial_count()), (2, 2));

        let r = registry.submit_guess(&id, "1234").unwrap();
        assert!(r.won());
        assert_eq!(r.attempt_number(), 2);

        assert_eq!(
            registry.submit_guess(&id, "1234"),
            Err(GameError::GameAlreadyFinished)
        );
        let state = registry.session_state(&id).unwrap();
        assert_eq!(state.attempts, 2);
        assert!(state.finished);
    }

    #[test]
    fn test_remove_session() {
        let registry = SessionRegistry::new();
        let id = registry.create_session().unwrap();
        assert!(registry.remove_session(&id));
        assert!(!registry.remove_session(&id));
        assert!(!registry.contains(&id));
        assert_eq!(registry.active_count(), 0);
    }
}
