//! Audit Records
//!
//! Self-contained: symbols by name, reel stops and an outcome hash, so a
//! record can be replayed against the game config without the session.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::hash::{hash_outcome, outcome_hex};
use crate::game::config::GameConfig;
use crate::game::grid::Cell;
use crate::session::protocol::SettlementRecord;
use crate::session::state::SessionId;

/// One paid combination, by symbol name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLine {
    /// Payline index, -1 for scatter.
    pub payline: i32,
    /// Symbol name.
    pub symbol: String,
    /// Run length or scatter count.
    pub count: usize,
    /// Payout in bet units.
    pub payout: u64,
    /// Winning cells.
    pub cells: Vec<Cell>,
}

/// One settled spin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Round id from the settlement.
    pub round_id: String,
    /// Session settled against.
    pub session_id: SessionId,
    /// Game played.
    pub game_id: String,
    /// Nominal bet.
    pub bet_amount: u64,
    /// Total payout in bet units.
    pub win_amount: u64,
    /// Was the spin free-spin funded?
    pub free_spin: bool,
    /// Free spins awarded by this spin.
    pub free_spins_awarded: u32,
    /// Reel stops drawn.
    pub stops: Vec<u32>,
    /// Visible grid, one column of names per reel.
    pub grid: Vec<Vec<String>>,
    /// Winning lines in evaluation order.
    pub winning_lines: Vec<AuditLine>,
    /// Scatters on the grid.
    pub scatter_count: u32,
    /// Hex SHA-256 outcome hash.
    pub outcome_hash: String,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Build from a settlement and the config it was settled under.
    pub fn from_settlement(record: &SettlementRecord, config: &GameConfig) -> Self {
        let result = &record.result;

        let grid = result
            .grid
            .columns()
            .map(|column| column.iter().map(|&s| config.symbol_name(s).to_string()).collect())
            .collect();

        let winning_lines = result
            .winning_lines
            .iter()
            .map(|line| AuditLine {
                payline: line.payline_index(),
                symbol: config.symbol_name(line.symbol).to_string(),
                count: line.count,
                payout: line.payout,
                cells: line.cells.clone(),
            })
            .collect();

        let hash = hash_outcome(&record.game_id, record.bet_amount, result);

        Self {
            round_id: record.round_id.clone(),
            session_id: record.session_id.clone(),
            game_id: record.game_id.clone(),
            bet_amount: record.bet_amount,
            win_amount: result.total_win,
            free_spin: record.free_spin,
            free_spins_awarded: record.free_spins_awarded,
            stops: result.stops.clone(),
            grid,
            winning_lines,
            scatter_count: result.scatter.count,
            outcome_hash: outcome_hex(&hash),
            timestamp: Utc::now(),
        }
    }

    /// Bet actually taken from the balance, in bet units.
    pub fn charged_bet(&self) -> u64 {
        if self.free_spin {
            0
        } else {
            self.bet_amount
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::money::Money;
    use crate::core::rng::DeterministicRng;
    use crate::game::evaluate::spin;
    use crate::game::loader::SNOW_KINGDOM_JSON;

    pub(crate) fn builtin() -> GameConfig {
        GameConfig::from_json("snow_kingdom", SNOW_KINGDOM_JSON).unwrap()
    }

    /// Settlement-shaped record for a seeded spin.
    pub(crate) fn settled(config: &GameConfig, session: &str, seed: u64, bet: u64, free_spin: bool) -> SettlementRecord {
        let result = spin(config, bet, &mut DeterministicRng::new(seed));
        let win = Money::from_units(result.total_win);
        let charged = if free_spin { Money::ZERO } else { Money::from_units(bet) };
        let prev = Money::from_units(1000);
        SettlementRecord {
            session_id: SessionId::new(session),
            round_id: format!("round-{seed}"),
            game_id: config.game_id.clone(),
            prev_balance: prev,
            new_balance: prev - charged + win,
            bet_amount: bet,
            bet_charged: charged,
            win_amount: win,
            free_spin,
            free_spins_awarded: if result.scatter.triggered_free_spins { config.free_spins_awarded } else { 0 },
            free_spins_remaining: 0,
            free_spins_total_win: Money::ZERO,
            result,
        }
    }

    #[test]
    fn test_record_uses_names() {
        let config = builtin();
        let settlement = settled(&config, "s1", 5, 2, false);
        let record = AuditRecord::from_settlement(&settlement, &config);

        assert_eq!(record.grid.len(), 6);
        assert!(record.grid.iter().all(|c| c.len() == 4));
        assert!(record
            .grid
            .iter()
            .flatten()
            .all(|name| config.symbols.id(name).is_some()));
        assert_eq!(record.stops, settlement.result.stops);
        assert_eq!(record.win_amount, settlement.result.total_win);
        assert_eq!(record.winning_lines.len(), settlement.result.winning_lines.len());
        assert_eq!(record.outcome_hash.len(), 64);
    }

    #[test]
    fn test_charged_bet() {
        let config = builtin();
        let paid = AuditRecord::from_settlement(&settled(&config, "s1", 1, 3, false), &config);
        let free = AuditRecord::from_settlement(&settled(&config, "s1", 1, 3, true), &config);
        assert_eq!(paid.charged_bet(), 3);
        assert_eq!(free.charged_bet(), 0);
        assert_eq!(paid.outcome_hash, free.outcome_hash);
    }

    #[test]
    fn test_json_is_camel_case() {
        let config = builtin();
        let record = AuditRecord::from_settlement(&settled(&config, "s1", 1, 1, false), &config);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("outcomeHash").is_some());
        assert!(json.get("freeSpinsAwarded").is_some());
        let back: AuditRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
