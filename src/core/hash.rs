//! Outcome Hashing for Audit
//!
//! Every settled spin carries a SHA-256 digest of what was drawn and what
//! was paid. Replaying the recorded reel stops must reproduce it exactly.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  "SNOW_KINGDOM_SPIN_V1"                                      │
//! │  game_id (len-prefixed) | bet u64                            │
//! │  stops: count u32, stop u32 ...                              │
//! │  grid: reels u32, rows u32, symbol u8 ... (column-major)     │
//! │  lines: count u32, (index i32, symbol u8, count u32, pay u64)│
//! │  total_win u64                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers little-endian. Field order is part of the format.

use sha2::{Sha256, Digest};

use crate::game::result::SpinResult;

/// Hash output type (256 bits / 32 bytes)
pub type OutcomeHash = [u8; 32];

/// Domain separator for spin outcomes.
pub const SPIN_DOMAIN: &[u8] = b"SNOW_KINGDOM_SPIN_V1";

/// Deterministic hasher over length-prefixed fields.
///
/// Order of updates is critical for determinism.
pub struct OutcomeHasher {
    hasher: Sha256,
}

impl OutcomeHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Hasher for spin outcomes.
    pub fn for_spin() -> Self {
        Self::new(SPIN_DOMAIN)
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed string.
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> OutcomeHash {
        self.hasher.finalize().into()
    }
}

/// Hash a settled spin outcome.
pub fn hash_outcome(game_id: &str, bet: u64, result: &SpinResult) -> OutcomeHash {
    let mut h = OutcomeHasher::for_spin();

    h.update_str(game_id);
    h.update_u64(bet);

    h.update_u32(result.stops.len() as u32);
    for &stop in &result.stops {
        h.update_u32(stop);
    }

    h.update_u32(result.grid.reels() as u32);
    h.update_u32(result.grid.rows() as u32);
    for (_, symbol) in result.grid.iter() {
        h.update_u8(symbol.0);
    }

    h.update_u32(result.winning_lines.len() as u32);
    for line in &result.winning_lines {
        h.update_i32(line.payline_index());
        h.update_u8(line.symbol.0);
        h.update_u32(line.count as u32);
        h.update_u64(line.payout);
    }

    h.update_u64(result.total_win);
    h.finalize()
}

/// Hex form used in audit records.
pub fn outcome_hex(hash: &OutcomeHash) -> String {
    hex::encode(hash)
}

// =============================================================================
// TESTS
// =============================================================================
