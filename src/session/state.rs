//! Session State
//!
//! One player's wallet and free-spin entitlement for one game.
//! Sessions are never deleted, only reset.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::money::Money;
use crate::game::result::SpinResult;

/// Unique session identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id (uuid v4, simple form).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank ids are replaced by generated ones at the boundary.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Persistent per-session state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Session identifier.
    pub session_id: SessionId,
    /// Owning player.
    pub player_id: String,
    /// Operator the player came through.
    pub operator_id: String,
    /// Game played in this session.
    pub game_id: String,
    /// Current balance. Never negative.
    pub balance: Money,
    /// Unused free spins.
    pub free_spins_remaining: u32,
    /// Payout of the most recent spin.
    pub last_win: Money,
    /// Winnings accumulated since the last free-spin trigger.
    pub free_spins_total_win: Money,
    /// Most recent spin.
    pub last_result: Option<SpinResult>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last settled or reset.
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Create a session with `balance` and no free spins.
    pub fn new(
        session_id: SessionId,
        player_id: impl Into<String>,
        operator_id: impl Into<String>,
        game_id: impl Into<String>,
        balance: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            player_id: player_id.into(),
            operator_id: operator_id.into(),
            game_id: game_id.into(),
            balance,
            free_spins_remaining: 0,
            last_win: Money::ZERO,
            free_spins_total_win: Money::ZERO,
            last_result: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Restore `balance` and zero every counter.
    ///
    /// Identity fields and `created_at` are kept.
    pub fn reset(&mut self, balance: Money) {
        self.balance = balance;
        self.free_spins_remaining = 0;
        self.last_win = Money::ZERO;
        self.free_spins_total_win = Money::ZERO;
        self.last_result = None;
        self.updated_at = Utc::now();
    }

    /// Is the next spin funded by a free spin?
    #[inline]
    pub fn has_free_spins(&self) -> bool {
        self.free_spins_remaining > 0
    }

    /// Can a spin of `bet` be funded at all?
    pub fn can_fund(&self, bet: Money) -> bool {
        self.has_free_spins() || self.balance >= bet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionState {
        SessionState::new(
            SessionId::new("s1"),
            "player-1",
            "LOCAL",
            "snow_kingdom",
            Money::from_units(10),
        )
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(!a.as_str().contains('-'));
    }

    #[test]
    fn test_reset_preserves_identity() {
        let mut s = session();
        s.balance = Money::from_units(3);
        s.free_spins_remaining = 7;
        s.last_win = Money::from_units(5);
        s.free_spins_total_win = Money::from_units(12);
        let created = s.created_at;

        s.reset(Money::from_units(1000));
        assert_eq!(s.balance, Money::from_units(1000));
        assert_eq!(s.free_spins_remaining, 0);
        assert_eq!(s.last_win, Money::ZERO);
        assert_eq!(s.free_spins_total_win, Money::ZERO);
        assert!(s.last_result.is_none());
        assert_eq!(s.session_id.as_str(), "s1");
        assert_eq!(s.player_id, "player-1");
        assert_eq!(s.operator_id, "LOCAL");
        assert_eq!(s.game_id, "snow_kingdom");
        assert_eq!(s.created_at, created);
    }

    #[test]
    fn test_can_fund() {
        let mut s = session();
        assert!(s.can_fund(Money::from_units(10)));
        assert!(!s.can_fund(Money::from_units(11)));

        s.balance = Money::ZERO;
        assert!(!s.can_fund(Money::from_units(1)));
        s.free_spins_remaining = 1;
        assert!(s.can_fund(Money::from_units(5)));
    }

    #[test]
    fn test_serde_shape() {
        let s = session();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["balance"], 1000);
        let back: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
