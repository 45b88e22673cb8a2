//! Snow Kingdom Game Server
//!
//! Demo run: settles a seeded sequence of spins against one session,
//! reports the results and verifies every audit record by replay.
//!
//! Environment:
//! - `RUST_LOG`: log filter (default `info`)
//! - `SLOT_CONFIG_DIR`: directory of `<game_id>.json` files (default built-in)
//! - `SLOT_AUDIT_LOG`: JSON-lines audit file (default none)
//! - `SLOT_SEED`: server seed (default 12345)
//! - `SLOT_SPINS`: spins to settle (default 200)
//! - `SLOT_DEFAULT_BALANCE`, `SLOT_DEFAULT_GAME`, `SLOT_DEFAULT_OPERATOR`

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snow_kingdom::{
    VERSION,
    audit::{verify_record, AuditSink, JsonLinesAuditLog, MemoryAuditLog, TeeAuditSink},
    core::{money::Money, rng::DeterministicRng},
    game::loader::{ConfigSource, DirectorySource, GameConfigStore, MemorySource},
    session::{SessionId, SessionManager, Settlement, SettlementConfig, SettlementError, SpinRequest},
};

const DEFAULT_SEED: u64 = 12345;
const DEFAULT_SPINS: u64 = 200;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Snow Kingdom Server v{}", VERSION);

    let settings = SettlementConfig::from_env();
    let seed = env_u64("SLOT_SEED", DEFAULT_SEED);
    let spins = env_u64("SLOT_SPINS", DEFAULT_SPINS);

    let source: Arc<dyn ConfigSource> = match std::env::var("SLOT_CONFIG_DIR") {
        Ok(dir) => {
            info!("Loading game configurations from {}", dir);
            Arc::new(DirectorySource::new(dir))
        }
        Err(_) => Arc::new(MemorySource::builtin()),
    };
    let configs = Arc::new(GameConfigStore::new(source));

    let memory_log = Arc::new(MemoryAuditLog::new());
    let mut sink = TeeAuditSink::new().with(memory_log.clone());
    if let Ok(path) = std::env::var("SLOT_AUDIT_LOG") {
        let file_log = JsonLinesAuditLog::open(&path)
            .await
            .with_context(|| format!("opening audit log {path}"))?;
        info!("Writing audit records to {}", path);
        sink = sink.with(Arc::new(file_log));
    }
    let sink: Arc<dyn AuditSink> = Arc::new(sink);

    let sessions = Arc::new(SessionManager::in_memory(settings.clone()));
    let settlement = Settlement::new(sessions.clone(), configs.clone(), sink);

    demo_session(&settlement, &settings, seed, spins).await?;
    settlement.flush_audit().await;

    // Print final results
    let stats = memory_log.stats().await;
    info!("=== Results ===");
    info!("Spins: {} ({} free)", stats.total_spins, stats.free_spin_count);
    info!(
        "Bets: {} ({} charged)  Wins: {}",
        stats.total_bets, stats.total_charged, stats.total_wins
    );
    info!("Free spins awarded: {}", stats.total_free_spins_awarded);
    info!("RTP: {:.2}%", stats.rtp() * 100.0);

    // Verify every record by replaying its reel stops
    info!("=== Verifying Audit Trail ===");
    let records = memory_log.records().await;
    let mut failures = 0usize;
    for record in &records {
        let config = configs
            .load(&record.game_id)
            .await
            .with_context(|| format!("loading {} for verification", record.game_id))?;
        if verify_record(record, &config).is_err() {
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} audit records failed replay", failures, records.len());
    }
    info!("REPLAY VERIFIED: {} records match", records.len());
    Ok(())
}

/// Settle `spins` seeded rounds against one demo session.
async fn demo_session(
    settlement: &Settlement,
    settings: &SettlementConfig,
    seed: u64,
    spins: u64,
) -> anyhow::Result<()> {
    info!("=== Starting Demo Session ===");

    let session_id = SessionId::new("demo");
    let session = settlement.sessions().get_or_create(&session_id).await?;
    let config = settlement
        .configs()
        .load(&session.game_id)
        .await
        .with_context(|| format!("loading game {}", session.game_id))?;
    let bet = *config
        .bet_amounts
        .first()
        .context("game has no bet amounts")?;

    info!(
        "Game: {} ({} reels x {} rows, {} paylines)",
        config.name,
        config.reels,
        config.rows,
        config.paylines.len()
    );
    info!("Session {} starting balance {}, bet {}", session_id, session.balance, bet);
    info!("Server seed: {}", seed);

    let server_seed = seed.to_le_bytes();
    let mut best_win = Money::ZERO;

    for round in 0..spins {
        let mut rng = DeterministicRng::for_round(&server_seed, session_id.as_str(), round);
        let request = SpinRequest::new(session_id.clone(), bet);

        let record = match settlement.spin(request, &mut rng).await {
            Ok(record) => record,
            Err(SettlementError::InsufficientFunds { balance, .. }) => {
                warn!("Out of funds after {} rounds (balance {})", round, balance);
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if record.free_spins_awarded > 0 {
            info!(
                "Round {}: {} scatters, {} free spins awarded",
                round, record.result.scatter.count, record.free_spins_awarded
            );
        }
        if record.win_amount > best_win {
            best_win = record.win_amount;
            info!(
                "Round {}: new best win {} on {} line(s)",
                round,
                record.win_amount,
                record.result.winning_lines.len()
            );
        }
    }

    if let Some(state) = settlement.sessions().get(&session_id).await? {
        info!(
            "Session {} final balance {} ({} free spins left, default was {})",
            state.session_id, state.balance, state.free_spins_remaining, settings.default_balance
        );
    }
    Ok(())
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Ignoring {}={:?}, using {}", name, value, default);
            default
        }),
        Err(_) => default,
    }
}
