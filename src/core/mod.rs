//! Core primitives.
//!
//! Exact currency, reproducible randomness and outcome hashing. Nothing
//! here knows about sessions.

pub mod money;
pub mod rng;
pub mod hash;

// Re-export core types
pub use money::{Money, MONEY_SCALE, DEFAULT_BALANCE};
pub use rng::{DeterministicRng, RandomSource, ScriptedSource, derive_spin_seed};
pub use hash::{OutcomeHash, OutcomeHasher, hash_outcome};
