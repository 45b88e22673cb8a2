//! Spin Settlement
//!
//! The single entry point that turns a spin request into a committed
//! balance change.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  lock session                                                  │
//! │  resolve / create session ──────────────► persisted            │
//! │  load game config            ─► ConfigNotFound / ConfigInvalid │
//! │  validate bet                ─► InvalidBet                     │
//! │  balance < bet && no free spins ─► InsufficientFunds           │
//! │  ── nothing random happens above this line ──                  │
//! │  draw + evaluate (nominal bet)                                 │
//! │  free spin -1   XOR   balance -bet                             │
//! │  balance +win                                                  │
//! │  trigger: free spins +award, window reset                      │
//! │  else if free spin: window +win                                │
//! │  save snapshot (single commit) ─► StoreError surfaces          │
//! │  unlock session                                                │
//! │  queue audit record (no wait)   ─► failures logged, ignored    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn, debug, instrument};

use crate::audit::log::AuditSink;
use crate::audit::record::AuditRecord;
use crate::audit::writer::AuditWriter;
use crate::core::money::{Money, DEFAULT_BALANCE};
use crate::core::rng::RandomSource;
use crate::game::config::ConfigError;
use crate::game::evaluate::spin;
use crate::game::loader::{GameConfigStore, SNOW_KINGDOM_ID};
use crate::session::manager::SessionManager;
use crate::session::protocol::{SettlementRecord, SpinRequest};
use crate::session::state::SessionId;
use crate::session::store::StoreError;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Defaults applied to new and reset sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    /// Starting balance.
    pub default_balance: Money,
    /// Game for sessions created without one.
    pub default_game_id: String,
    /// Operator for sessions created without one.
    pub default_operator_id: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            default_balance: DEFAULT_BALANCE,
            default_game_id: SNOW_KINGDOM_ID.to_string(),
            default_operator_id: "LOCAL".to_string(),
        }
    }
}

impl SettlementConfig {
    /// Create config from environment variables.
    ///
    /// `SLOT_DEFAULT_BALANCE` (e.g. `"1000.00"`), `SLOT_DEFAULT_GAME`,
    /// `SLOT_DEFAULT_OPERATOR`. Unset or unparseable values keep defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_balance: std::env::var("SLOT_DEFAULT_BALANCE")
                .ok()
                .and_then(|v| match v.parse::<Money>() {
                    Ok(balance) => Some(balance),
                    Err(e) => {
                        warn!("Ignoring SLOT_DEFAULT_BALANCE: {}", e);
                        None
                    }
                })
                .unwrap_or(defaults.default_balance),
            default_game_id: std::env::var("SLOT_DEFAULT_GAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_game_id),
            default_operator_id: std::env::var("SLOT_DEFAULT_OPERATOR")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_operator_id),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Settlement errors.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    /// Balance below the bet and no free spins left.
    #[error("insufficient funds: balance {balance}, bet {bet}")]
    InsufficientFunds {
        /// Balance at the time of the request.
        balance: Money,
        /// Bet requested.
        bet: Money,
    },

    /// Bet is not one of the game's denominations.
    #[error("bet {bet} is not allowed, expected one of {allowed:?}")]
    InvalidBet {
        /// Bet requested.
        bet: u64,
        /// Allowed denominations.
        allowed: Vec<u64>,
    },

    /// Game configuration missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Anything else.
    #[error("internal settlement error: {0}")]
    Internal(String),
}

impl SettlementError {
    /// No configuration for the requested game.
    pub fn is_config_not_found(&self) -> bool {
        matches!(self, Self::Config(e) if e.is_not_found())
    }

    /// The requested game's configuration is malformed.
    pub fn is_config_invalid(&self) -> bool {
        matches!(self, Self::Config(e) if e.is_invalid())
    }
}

// =============================================================================
// SETTLEMENT
// =============================================================================

/// Settles spins against sessions.
pub struct Settlement {
    sessions: Arc<SessionManager>,
    configs: Arc<GameConfigStore>,
    audit: AuditWriter,
}

impl Settlement {
    /// Create a settlement service writing audit records to `audit`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime (the audit writer is a task).
    pub fn new(
        sessions: Arc<SessionManager>,
        configs: Arc<GameConfigStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            sessions,
            configs,
            audit: AuditWriter::spawn(audit),
        }
    }

    /// Session manager in use.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Config store in use.
    pub fn configs(&self) -> &Arc<GameConfigStore> {
        &self.configs
    }

    /// Wait until every audit record queued so far has reached the sink.
    pub async fn flush_audit(&self) {
        self.audit.flush().await;
    }

    /// Settle one spin, drawing reel stops from `rng`.
    ///
    /// Same-session calls are serialized. Nothing is drawn from `rng`
    /// unless the spin is accepted. The session is written exactly once,
    /// after every balance and free-spin change has been computed. The
    /// session lock is released before the audit record is queued, and
    /// the sink is never awaited.
    #[instrument(skip_all, fields(session = ?request.session_id, bet = request.bet_amount))]
    pub async fn spin<R>(
        &self,
        request: SpinRequest,
        rng: &mut R,
    ) -> Result<SettlementRecord, SettlementError>
    where
        R: RandomSource + ?Sized,
    {
        let session_id = match request.session_id {
            Some(id) if !id.is_empty() => id,
            _ => SessionId::generate(),
        };

        let guard = self.sessions.lock(&session_id).await;
        let mut state = self.sessions.resolve(&session_id).await?;

        let game_id = request
            .game_id
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| state.game_id.clone());
        let config = self.configs.load(&game_id).await?;

        let bet = request.bet_amount;
        if !config.is_allowed_bet(bet) {
            debug!("Rejected bet {} on {}", bet, game_id);
            return Err(SettlementError::InvalidBet {
                bet,
                allowed: config.bet_amounts.clone(),
            });
        }

        let bet_money = Money::from_units(bet);
        if !state.can_fund(bet_money) {
            debug!("Insufficient funds: balance {}, bet {}", state.balance, bet_money);
            return Err(SettlementError::InsufficientFunds {
                balance: state.balance,
                bet: bet_money,
            });
        }

        let result = spin(&config, bet, rng);

        let prev_balance = state.balance;
        let free_spin = state.has_free_spins();
        let bet_charged = if free_spin {
            state.free_spins_remaining -= 1;
            Money::ZERO
        } else {
            state.balance = state
                .balance
                .checked_sub(bet_money)
                .ok_or_else(|| SettlementError::Internal("balance underflow".into()))?;
            bet_money
        };

        let win = Money::from_units(result.total_win);
        state.balance = state
            .balance
            .checked_add(win)
            .ok_or_else(|| SettlementError::Internal("balance overflow".into()))?;

        let free_spins_awarded = if result.scatter.triggered_free_spins {
            state.free_spins_remaining = state
                .free_spins_remaining
                .saturating_add(config.free_spins_awarded);
            state.free_spins_total_win = Money::ZERO;
            info!(
                "Session {} triggered {} free spins ({} scatters)",
                session_id, config.free_spins_awarded, result.scatter.count
            );
            config.free_spins_awarded
        } else {
            if free_spin {
                state.free_spins_total_win += win;
            }
            0
        };

        state.game_id = game_id;
        state.last_win = win;
        state.last_result = Some(result.clone());
        state.updated_at = Utc::now();

        self.sessions.commit(&state).await?;
        drop(guard);

        let record = SettlementRecord {
            session_id: session_id.clone(),
            round_id: uuid::Uuid::new_v4().to_string(),
            game_id: state.game_id.clone(),
            prev_balance,
            new_balance: state.balance,
            bet_amount: bet,
            bet_charged,
            win_amount: win,
            free_spin,
            free_spins_awarded,
            free_spins_remaining: state.free_spins_remaining,
            free_spins_total_win: state.free_spins_total_win,
            result,
        };

        debug!(
            "Settled round {}: {} -> {} (bet {}, win {}, free spins {})",
            record.round_id,
            record.prev_balance,
            record.new_balance,
            record.bet_charged,
            record.win_amount,
            record.free_spins_remaining
        );

        self.audit.submit(AuditRecord::from_settlement(&record, &config));

        Ok(record)
    }
}

// =============================================================================
// TESTS
// =============================================================================
