//! Session Persistence
//!
//! Reads are by session id and distinguish "absent" from "present".
//! Writes replace the whole snapshot.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::session::state::{SessionId, SessionState};

/// Session store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed persistence for [`SessionState`] snapshots.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session, `Ok(None)` if it does not exist.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError>;

    /// Insert or replace a session snapshot.
    async fn save(&self, state: &SessionState) -> Result<(), StoreError>;

    /// All sessions owned by `player_id`, oldest first.
    async fn list_by_player(&self, player_id: &str) -> Result<Vec<SessionState>, StoreError>;

    /// Number of stored sessions.
    async fn count(&self) -> Result<usize, StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<BTreeMap<SessionId, SessionState>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(state.session_id.clone(), state.clone());
        Ok(())
    }

    async fn list_by_player(&self, player_id: &str) -> Result<Vec<SessionState>, StoreError> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<SessionState> = sessions
            .values()
            .filter(|s| s.player_id == player_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        Ok(found)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.sessions.read().await.len())
    }
}
