//! Replay Verification
//!
//! Re-derives an audit record's outcome from its reel stops:
//!
//! ```text
//! stops ──► ScriptedSource ──► spin(config, bet) ──► grid, lines, hash
//!                                                      │
//!                     compare against the record ◄─────┘
//! ```

use tracing::warn;

use crate::audit::record::AuditRecord;
use crate::core::hash::{hash_outcome, outcome_hex};
use crate::core::rng::ScriptedSource;
use crate::game::config::GameConfig;
use crate::game::evaluate::spin;

/// Why a record failed replay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The record was settled under a different game.
    #[error("record is for game {recorded}, config is {config}")]
    GameMismatch {
        /// Game id in the record.
        recorded: String,
        /// Game id of the config supplied.
        config: String,
    },

    /// Wrong number of reel stops for the game.
    #[error("record has {actual} reel stops, game has {expected} reels")]
    StopCount {
        /// Reel count.
        expected: usize,
        /// Stops recorded.
        actual: usize,
    },

    /// Replayed grid differs from the recorded one.
    #[error("replayed grid does not match the recorded grid")]
    GridMismatch,

    /// Replayed payout differs from the recorded one.
    #[error("recorded win {recorded}, replay pays {replayed}")]
    PayoutMismatch {
        /// Win in the record.
        recorded: u64,
        /// Win on replay.
        replayed: u64,
    },

    /// Replayed outcome hash differs from the recorded one.
    #[error("outcome hash mismatch: recorded {recorded}, replayed {replayed}")]
    HashMismatch {
        /// Hash in the record.
        recorded: String,
        /// Hash on replay.
        replayed: String,
    },
}

/// Replay `record` against `config`.
pub fn verify_record(record: &AuditRecord, config: &GameConfig) -> Result<(), VerificationError> {
    let result = check(record, config);
    if let Err(e) = &result {
        warn!("Audit record {} failed verification: {}", record.round_id, e);
    }
    result
}

fn check(record: &AuditRecord, config: &GameConfig) -> Result<(), VerificationError> {
    if record.game_id != config.game_id {
        return Err(VerificationError::GameMismatch {
            recorded: record.game_id.clone(),
            config: config.game_id.clone(),
        });
    }
    if record.stops.len() != config.reels {
        return Err(VerificationError::StopCount {
            expected: config.reels,
            actual: record.stops.len(),
        });
    }

    let mut source = ScriptedSource::new(record.stops.clone());
    let replayed = spin(config, record.bet_amount, &mut source);

    let grid_matches = replayed.grid.columns().count() == record.grid.len()
        && replayed
            .grid
            .columns()
            .zip(&record.grid)
            .all(|(column, names)| {
                column.len() == names.len()
                    && column
                        .iter()
                        .zip(names)
                        .all(|(&symbol, name)| config.symbol_name(symbol) == name)
            });
    if !grid_matches {
        return Err(VerificationError::GridMismatch);
    }

    if replayed.total_win != record.win_amount {
        return Err(VerificationError::PayoutMismatch {
            recorded: record.win_amount,
            replayed: replayed.total_win,
        });
    }

    let hash = outcome_hex(&hash_outcome(&record.game_id, record.bet_amount, &replayed));
    if hash != record.outcome_hash {
        return Err(VerificationError::HashMismatch {
            recorded: record.outcome_hash.clone(),
            replayed: hash,
        });
    }

    Ok(())
}
