//! Session Management
//!
//! Owns the session store and the per-session mutual exclusion.
//!
//! ```text
//! locks: RwLock<BTreeMap<SessionId, Arc<Mutex<()>>>>
//!          │
//!          ├── "a1f3..."  ──► Mutex   spin, spin, reset  (serialized)
//!          └── "9c2e..."  ──► Mutex   spin               (independent)
//! ```
//!
//! The map lock is held only long enough to find or insert a session's
//! mutex. Work on different sessions never waits on each other. Once the
//! map reaches [`LOCK_PRUNE_THRESHOLD`] entries, inserting a new one first
//! drops every mutex nobody holds or waits on.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{info, debug};

use crate::session::settle::SettlementConfig;
use crate::session::state::{SessionId, SessionState};
use crate::session::store::{MemorySessionStore, SessionStore, StoreError};

/// Lock map size at which idle session mutexes are dropped.
pub const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Exclusive access to one session until dropped.
pub type SessionGuard = OwnedMutexGuard<()>;

/// Session lifecycle and locking.
pub struct SessionManager {
    /// Snapshot persistence.
    store: Arc<dyn SessionStore>,
    /// Defaults for new and reset sessions.
    config: SettlementConfig,
    /// One mutex per recently locked session id.
    locks: RwLock<BTreeMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionManager {
    /// Create a manager over a store.
    pub fn new(store: Arc<dyn SessionStore>, config: SettlementConfig) -> Self {
        Self {
            store,
            config,
            locks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Manager backed by a fresh in-memory store.
    pub fn in_memory(config: SettlementConfig) -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), config)
    }

    /// Defaults in effect.
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Acquire the session's lock, creating it on first use.
    pub async fn lock(&self, id: &SessionId) -> SessionGuard {
        let existing = self.locks.read().await.get(id).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => {
                let mut locks = self.locks.write().await;
                if locks.len() >= LOCK_PRUNE_THRESHOLD && !locks.contains_key(id) {
                    // Only the map holds an idle mutex; every holder or
                    // waiter owns a clone taken under the map lock.
                    let before = locks.len();
                    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
                    debug!("Pruned {} idle session locks", before - locks.len());
                }
                locks.entry(id.clone()).or_default().clone()
            }
        };
        lock.lock_owned().await
    }

    /// Session mutexes currently tracked.
    pub async fn tracked_locks(&self) -> usize {
        self.locks.read().await.len()
    }

    /// Create a session with a generated id.
    pub async fn start_session(
        &self,
        player_id: &str,
        operator_id: &str,
        game_id: &str,
    ) -> Result<SessionState, StoreError> {
        let state = SessionState::new(
            SessionId::generate(),
            player_id,
            operator_id,
            game_id,
            self.config.default_balance,
        );
        self.store.save(&state).await?;

        info!(
            "Started session {} for player {} on {} via {}",
            state.session_id, player_id, game_id, operator_id
        );
        Ok(state)
    }

    /// Look up a session without creating it.
    pub async fn get(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        self.store.load(id).await
    }

    /// Look up a session, creating it with defaults if absent.
    pub async fn get_or_create(&self, id: &SessionId) -> Result<SessionState, StoreError> {
        let _guard = self.lock(id).await;
        self.resolve(id).await
    }

    /// Restore defaults, keeping identity. `Ok(None)` for unknown ids.
    pub async fn reset(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        let _guard = self.lock(id).await;

        let Some(mut state) = self.store.load(id).await? else {
            debug!("Reset of unknown session {} ignored", id);
            return Ok(None);
        };
        state.reset(self.config.default_balance);
        self.store.save(&state).await?;

        info!("Reset session {} to {}", id, state.balance);
        Ok(Some(state))
    }

    /// All sessions owned by a player.
    pub async fn sessions_for_player(&self, player_id: &str) -> Result<Vec<SessionState>, StoreError> {
        self.store.list_by_player(player_id).await
    }

    /// Stored session count.
    pub async fn session_count(&self) -> Result<usize, StoreError> {
        self.store.count().await
    }

    /// Load or create. Caller must hold the session's guard.
    pub(crate) async fn resolve(&self, id: &SessionId) -> Result<SessionState, StoreError> {
        if let Some(state) = self.store.load(id).await? {
            return Ok(state);
        }

        let player_id = format!("Player-{}", uuid::Uuid::new_v4().simple());
        let state = SessionState::new(
            id.clone(),
            player_id,
            self.config.default_operator_id.as_str(),
            self.config.default_game_id.as_str(),
            self.config.default_balance,
        );
        self.store.save(&state).await?;

        info!("Created session {} with balance {}", id, state.balance);
        Ok(state)
    }

    /// Replace the stored snapshot. Caller must hold the session's guard.
    pub(crate) async fn commit(&self, state: &SessionState) -> Result<(), StoreError> {
        self.store.save(state).await
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::in_memory(SettlementConfig::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================
