//! Audit Sinks
//!
//! Append-only, one record per settled spin. Settlement treats every
//! sink error as non-fatal.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::audit::record::AuditRecord;
use crate::session::state::SessionId;

/// Audit sink errors.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The log file could not be written or read.
    #[error("audit log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded.
    #[error("audit record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sink refused the record.
    #[error("audit sink rejected record: {0}")]
    Rejected(String),
}

/// One-way destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

// =============================================================================
// IN-MEMORY LOG
// =============================================================================

/// Aggregate figures over the whole log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Settled spins.
    pub total_spins: u64,
    /// Nominal bets of every spin, free spins included, in bet units.
    pub total_bets: u64,
    /// Bets charged to balances, in bet units.
    pub total_charged: u64,
    /// Payouts, in bet units.
    pub total_wins: u64,
    /// Spins funded by free spins.
    pub free_spin_count: u64,
    /// Free spins handed out by triggers.
    pub total_free_spins_awarded: u64,
    /// Distinct sessions seen.
    pub sessions: u64,
}

impl GameStats {
    /// Return to player: wins over charged bets. 0 with no charged bets.
    pub fn rtp(&self) -> f64 {
        if self.total_charged == 0 {
            0.0
        } else {
            self.total_wins as f64 / self.total_charged as f64
        }
    }
}

/// In-process log with history queries.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Up to `limit` records for a session, newest first.
    pub async fn history(&self, session_id: &SessionId, limit: usize) -> Vec<AuditRecord> {
        self.records
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| &r.session_id == session_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Every record, oldest first.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    /// Number of records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Is the log empty?
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Totals across all records.
    pub async fn stats(&self) -> GameStats {
        let records = self.records.read().await;
        let mut stats = GameStats::default();
        let mut sessions = BTreeSet::new();

        for record in records.iter() {
            stats.total_spins += 1;
            stats.total_bets = stats.total_bets.saturating_add(record.bet_amount);
            stats.total_charged = stats.total_charged.saturating_add(record.charged_bet());
            stats.total_wins = stats.total_wins.saturating_add(record.win_amount);
            if record.free_spin {
                stats.free_spin_count += 1;
            }
            stats.total_free_spins_awarded += u64::from(record.free_spins_awarded);
            sessions.insert(&record.session_id);
        }
        stats.sessions = sessions.len() as u64;
        stats
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

// =============================================================================
// JSON LINES FILE
// =============================================================================

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonLinesAuditLog {
    path: PathBuf,
    writer: Mutex<tokio::fs::File>,
}

impl JsonLinesAuditLog {
    /// Open (or create) `path` for appending.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        debug!("Audit log opened at {}", path.display());
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// File being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, skipping blank lines.
    pub async fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>, AuditError> {
        let file = tokio::fs::File::open(path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditSink for JsonLinesAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        // Whole line in one write, under the lock.
        let mut file = self.writer.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

// =============================================================================
// FAN-OUT
// =============================================================================

/// Forwards each record to several sinks.
///
/// Every sink is tried; the first error is returned.
#[derive(Default)]
pub struct TeeAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl TeeAuditSink {
    /// Create an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl AuditSink for TeeAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.append(record).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::record::tests::{builtin, settled};

    fn record(session: &str, seed: u64, bet: u64, free_spin: bool) -> AuditRecord {
        let config = builtin();
        AuditRecord::from_settlement(&settled(&config, session, seed, bet, free_spin), &config)
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let log = MemoryAuditLog::new();
        for seed in 0..5 {
            log.append(&record("a", seed, 1, false)).await.unwrap();
            log.append(&record("b", seed, 1, false)).await.unwrap();
        }

        let history = log.history(&SessionId::new("a"), 3).await;
        let rounds: Vec<&str> = history.iter().map(|r| r.round_id.as_str()).collect();
        assert_eq!(rounds, ["round-4", "round-3", "round-2"]);
        assert!(history.iter().all(|r| r.session_id.as_str() == "a"));

        assert!(log.history(&SessionId::new("zzz"), 10).await.is_empty());
        assert_eq!(log.len().await, 10);
    }

    #[tokio::test]
    async fn test_stats() {
        let log = MemoryAuditLog::new();
        let paid = record("a", 1, 2, false);
        let free = record("b", 2, 2, true);
        let mut awarded = record("b", 3, 5, false);
        awarded.free_spins_awarded = 10;

        for r in [&paid, &free, &awarded] {
            log.append(r).await.unwrap();
        }

        let stats = log.stats().await;
        assert_eq!(stats.total_spins, 3);
        assert_eq!(stats.total_bets, 2 + 2 + 5);
        assert_eq!(stats.total_charged, 2 + 5);
        assert_eq!(stats.rtp(), stats.total_wins as f64 / 7.0);
        assert_eq!(stats.total_wins, paid.win_amount + free.win_amount + awarded.win_amount);
        assert_eq!(stats.free_spin_count, 1);
        assert_eq!(stats.total_free_spins_awarded, 10 + free.free_spins_awarded as u64 + paid.free_spins_awarded as u64);
        assert_eq!(stats.sessions, 2);
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let log = MemoryAuditLog::new();
        assert!(log.is_empty().await);
        let stats = log.stats().await;
        assert_eq!(stats, GameStats::default());
        assert_eq!(stats.rtp(), 0.0);
    }

    #[tokio::test]
    async fn test_json_lines_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let a = record("a", 1, 1, false);
        let b = record("a", 2, 3, true);
        {
            let log = JsonLinesAuditLog::open(&path).await.unwrap();
            log.append(&a).await.unwrap();
            log.append(&b).await.unwrap();
            assert_eq!(log.path(), path.as_path());
        }

        // Reopening appends rather than truncates
        let log = JsonLinesAuditLog::open(&path).await.unwrap();
        log.append(&a).await.unwrap();

        let records = JsonLinesAuditLog::read_all(&path).await.unwrap();
        assert_eq!(records, vec![a.clone(), b, a]);
    }

    #[tokio::test]
    async fn test_json_lines_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        tokio::fs::write(&path, "not json\n").await.unwrap();

        let err = JsonLinesAuditLog::read_all(&path).await.unwrap_err();
        assert!(matches!(err, AuditError::Serialize(_)));
    }

    struct Offline;

    #[async_trait]
    impl AuditSink for Offline {
        async fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
            Err(AuditError::Rejected("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_tee_tries_every_sink() {
        let a = Arc::new(MemoryAuditLog::new());
        let b = Arc::new(MemoryAuditLog::new());
        let tee = TeeAuditSink::new()
            .with(a.clone())
            .with(Arc::new(Offline))
            .with(b.clone());

        let err = tee.append(&record("a", 1, 1, false)).await.unwrap_err();
        assert!(matches!(err, AuditError::Rejected(_)));
        assert_eq!(a.len().await, 1);
        assert_eq!(b.len().await, 1);
    }
}
