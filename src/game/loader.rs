//! Configuration Loading
//!
//! `load(game_id)` fetches a raw document from a [`ConfigSource`],
//! validates it and caches the result for the life of the process.
//! Failed loads are not cached; they fail again on the next attempt.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, error, debug};

use crate::game::config::{ConfigError, GameConfig};

/// Id of the built-in game.
pub const SNOW_KINGDOM_ID: &str = "snow_kingdom";

/// Built-in game document.
pub const SNOW_KINGDOM_JSON: &str = include_str!("../../games/snow_kingdom.json");

/// Supplies raw configuration documents by game id.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the JSON document for `game_id`, `Ok(None)` if there is none.
    async fn fetch(&self, game_id: &str) -> Result<Option<String>, ConfigError>;
}

/// Reads `<dir>/<game_id>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Game ids become file names, so keep them to a safe alphabet.
fn is_safe_game_id(game_id: &str) -> bool {
    !game_id.is_empty()
        && game_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[async_trait]
impl ConfigSource for DirectorySource {
    async fn fetch(&self, game_id: &str) -> Result<Option<String>, ConfigError> {
        if !is_safe_game_id(game_id) {
            return Ok(None);
        }

        let path = self.dir.join(format!("{game_id}.json"));
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration file at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(ConfigError::Io {
                game_id: game_id.to_string(),
                source,
            }),
        }
    }
}

/// In-memory documents.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: BTreeMap<String, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source holding only the built-in Snow Kingdom game.
    pub fn builtin() -> Self {
        Self::new().with_document(SNOW_KINGDOM_ID, SNOW_KINGDOM_JSON)
    }

    /// Add a document.
    pub fn with_document(mut self, game_id: impl Into<String>, json: impl Into<String>) -> Self {
        self.documents.insert(game_id.into(), json.into());
        self
    }
}

#[async_trait]
impl ConfigSource for MemorySource {
    async fn fetch(&self, game_id: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.documents.get(game_id).cloned())
    }
}

/// Validated configuration cache.
pub struct GameConfigStore {
    source: Arc<dyn ConfigSource>,
    cache: RwLock<BTreeMap<String, Arc<GameConfig>>>,
}

impl GameConfigStore {
    /// Create a store over a source.
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store serving the built-in game.
    pub fn builtin() -> Self {
        Self::new(Arc::new(MemorySource::builtin()))
    }

    /// Load, validate and cache the configuration for `game_id`.
    pub async fn load(&self, game_id: &str) -> Result<Arc<GameConfig>, ConfigError> {
        if let Some(config) = self.cache.read().await.get(game_id) {
            return Ok(config.clone());
        }

        let config = match self.fetch_and_validate(game_id).await {
            Ok(config) => Arc::new(config),
            Err(e) => {
                error!("Failed to load game configuration {}: {}", game_id, e);
                return Err(e);
            }
        };

        let mut cache = self.cache.write().await;
        // A concurrent load may have won; keep the first one.
        let cached = cache
            .entry(game_id.to_string())
            .or_insert_with(|| {
                info!(
                    "Loaded game configuration for {} ({} reels x {} rows, {} paylines)",
                    game_id,
                    config.reels,
                    config.rows,
                    config.paylines.len()
                );
                config
            })
            .clone();
        Ok(cached)
    }

    async fn fetch_and_validate(&self, game_id: &str) -> Result<GameConfig, ConfigError> {
        let json = self
            .source
            .fetch(game_id)
            .await?
            .ok_or_else(|| ConfigError::NotFound(game_id.to_string()))?;
        GameConfig::from_json(game_id, &json)
    }

    /// Ids currently cached.
    pub async fn cached_ids(&self) -> Vec<String> {
        self.cache.read().await.keys().cloned().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_builtin() {
        let store = GameConfigStore::builtin();
        let config = store.load(SNOW_KINGDOM_ID).await.unwrap();
        assert_eq!(config.game_id, SNOW_KINGDOM_ID);
        assert_eq!(config.name, "Snow Kingdom");
    }

    #[tokio::test]
    async fn test_load_is_cached() {
        let store = GameConfigStore::builtin();
        let a = store.load(SNOW_KINGDOM_ID).await.unwrap();
        let b = store.load(SNOW_KINGDOM_ID).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.cached_ids().await, vec![SNOW_KINGDOM_ID.to_string()]);
    }

    #[tokio::test]
    async fn test_missing_game() {
        let store = GameConfigStore::builtin();
        let err = store.load("unknown_game").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_game_not_cached() {
        let source = MemorySource::new().with_document("broken", r#"{"wildSymbol": "W"}"#);
        let store = GameConfigStore::new(Arc::new(source));

        let err = store.load("broken").await.unwrap_err();
        assert!(err.is_invalid());
        assert!(store.cached_ids().await.is_empty());

        // Other games are unaffected by one bad document
        let err = store.load("snow_kingdom").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frosty.json"), SNOW_KINGDOM_JSON).unwrap();

        let store = GameConfigStore::new(Arc::new(DirectorySource::new(dir.path())));
        let config = store.load("frosty").await.unwrap();
        assert_eq!(config.reels, 6);

        assert!(store.load("absent").await.unwrap_err().is_not_found());
        assert!(store.load("../frosty").await.unwrap_err().is_not_found());
    }
}
