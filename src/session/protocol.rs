//! Settlement Boundary Types
//!
//! What callers send in and get back from one settled spin.

use serde::{Serialize, Deserialize};

use crate::core::money::Money;
use crate::game::result::SpinResult;
use crate::session::state::SessionId;

/// A spin request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequest {
    /// Target session. Absent or blank starts a new one.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Nominal bet, one of the game's allowed amounts.
    pub bet_amount: u64,
    /// Play a different game than the session's current one.
    #[serde(default)]
    pub game_id: Option<String>,
}

impl SpinRequest {
    /// Spin `bet_amount` on an existing (or to-be-created) session.
    pub fn new(session_id: impl Into<SessionId>, bet_amount: u64) -> Self {
        Self {
            session_id: Some(session_id.into()),
            bet_amount,
            game_id: None,
        }
    }

    /// Override the game for this spin and onward.
    pub fn with_game(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = Some(game_id.into());
        self
    }
}

/// Financial effect of one settled spin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    /// Session settled against.
    pub session_id: SessionId,
    /// Unique id of this round.
    pub round_id: String,
    /// Game the spin was played on.
    pub game_id: String,
    /// Balance before the spin.
    pub prev_balance: Money,
    /// Balance after the spin.
    pub new_balance: Money,
    /// Nominal bet used for payout math.
    pub bet_amount: u64,
    /// Bet taken from the balance (zero for a free spin).
    pub bet_charged: Money,
    /// Total payout credited.
    pub win_amount: Money,
    /// Was this spin funded by a free spin?
    pub free_spin: bool,
    /// Free spins awarded by this spin.
    pub free_spins_awarded: u32,
    /// Free spins left after this spin.
    pub free_spins_remaining: u32,
    /// Winnings since the last free-spin trigger.
    pub free_spins_total_win: Money,
    /// The evaluated spin.
    pub result: SpinResult,
}

impl SettlementRecord {
    /// `new = prev - charged + win`
    pub fn is_balance_conserved(&self) -> bool {
        self.prev_balance
            .checked_sub(self.bet_charged)
            .and_then(|b| b.checked_add(self.win_amount))
            == Some(self.new_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json() {
        let request: SpinRequest =
            serde_json::from_str(r#"{"sessionId": "abc", "betAmount": 2}"#).unwrap();
        assert_eq!(request, SpinRequest::new("abc", 2));

        let request: SpinRequest =
            serde_json::from_str(r#"{"betAmount": 5, "gameId": "frosty"}"#).unwrap();
        assert!(request.session_id.is_none());
        assert_eq!(request.game_id.as_deref(), Some("frosty"));
    }
}
