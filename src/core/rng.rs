//! Random Sources
//!
//! The outcome engine never owns a generator. It consumes uniform integers
//! through the [`RandomSource`] capability, one draw per reel per spin.
//!
//! Two sources live here:
//! - [`DeterministicRng`]: seeded Xorshift128+, used by the demo binary,
//!   simulations and tests. Same seed, same spins, on every platform.
//! - [`ScriptedSource`]: replays recorded draws, used to re-derive a grid
//!   from the reel stops stored in an audit record.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// Capability that supplies uniform random integers.
pub trait RandomSource {
    /// Return an integer uniformly distributed in `[0, bound)`.
    ///
    /// A `bound` of 0 returns 0.
    fn next_int(&mut self, bound: u32) -> u32;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn next_int(&mut self, bound: u32) -> u32 {
        (**self).next_int(bound)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    #[inline]
    fn next_int(&mut self, bound: u32) -> u32 {
        (**self).next_int(bound)
    }
}

/// Deterministic PRNG using Xorshift128+ algorithm.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG will produce the exact same sequence
/// of random numbers on any platform (x86, ARM, WASM).
///
/// # Example
///
/// ```
/// use snow_kingdom::core::rng::{DeterministicRng, RandomSource};
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_int(34), b.next_int(34));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create RNG for one round of a session.
    pub fn for_round(server_seed: &[u8], session_id: &str, nonce: u64) -> Self {
        Self::new(derive_spin_seed(server_seed, session_id, nonce))
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, max).
    ///
    /// Rejection sampling keeps every reel stop equally likely.
    #[inline]
    pub fn next_below(&mut self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        // Values below the threshold would bias the modulo.
        let threshold = max.wrapping_neg() % max;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return r % max;
            }
        }
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

impl RandomSource for DeterministicRng {
    #[inline]
    fn next_int(&mut self, bound: u32) -> u32 {
        self.next_below(bound as u64) as u32
    }
}

/// Replays a fixed sequence of draws.
///
/// Each call consumes the next recorded value, reduced modulo `bound`.
/// Once exhausted it keeps returning 0.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    values: Vec<u32>,
    cursor: usize,
}

impl ScriptedSource {
    /// Create from recorded values.
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self { values: values.into(), cursor: 0 }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Has every recorded value been used?
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.values.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_int(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let value = self.values.get(self.cursor).copied().unwrap_or(0);
        self.cursor += 1;
        value % bound
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a per-round seed from a server seed, session and round nonce.
///
/// The server seed stays secret until rotation; publishing it afterwards
/// lets anyone re-derive every round's draws.
pub fn derive_spin_seed(server_seed: &[u8], session_id: &str, nonce: u64) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"SNOW_KINGDOM_SEED_V1");
    hasher.update((server_seed.len() as u64).to_le_bytes());
    hasher.update(server_seed);
    hasher.update((session_id.len() as u64).to_le_bytes());
    hasher.update(session_id.as_bytes());
    hasher.update(nonce.to_le_bytes());

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        // Same seed must produce same sequence
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(12345);

        for _ in 0..1000 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = DeterministicRng::new(12345);
        let mut rng2 = DeterministicRng::new(54321);

        // Very unlikely to match
        assert_ne!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn test_rng_known_values() {
        // These values must never change!
        // If they do, recorded rounds will no longer replay.
        let mut rng = DeterministicRng::new(42);
        assert_eq!(rng.next_u64(), 16629283624882167704);
        assert_eq!(rng.next_u64(), 1420492921613871959);
        assert_eq!(rng.next_u64(), 9768315062676884790);
    }

    #[test]
    fn test_next_int_bounds() {
        let mut rng = DeterministicRng::new(1234);

        for _ in 0..1000 {
            assert!(rng.next_int(34) < 34);
        }

        // Edge cases
        assert_eq!(rng.next_int(0), 0);
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_next_int_covers_range() {
        let mut rng = DeterministicRng::new(99);
        let mut seen = [false; 7];
        for _ in 0..500 {
            seen[rng.next_int(7) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_scripted_source() {
        let mut source = ScriptedSource::new(vec![3, 40, 7]);
        assert_eq!(source.next_int(10), 3);
        assert_eq!(source.next_int(34), 6);
        assert!(!source.is_exhausted());
        assert_eq!(source.next_int(34), 7);
        assert!(source.is_exhausted());
        assert_eq!(source.next_int(34), 0);
        assert_eq!(source.consumed(), 4);
    }

    #[test]
    fn test_derive_spin_seed() {
        let seed1 = derive_spin_seed(b"server", "session-a", 1);
        let seed2 = derive_spin_seed(b"server", "session-a", 1);
        assert_eq!(seed1, seed2);

        assert_ne!(seed1, derive_spin_seed(b"server", "session-a", 2));
        assert_ne!(seed1, derive_spin_seed(b"server", "session-b", 1));
        assert_ne!(seed1, derive_spin_seed(b"other", "session-a", 1));
    }

    #[test]
    fn test_state_checkpoint() {
        let mut rng = DeterministicRng::new(5555);
        for _ in 0..50 {
            rng.next_u64();
        }

        let saved_state = rng.state();
        let next_values: Vec<u64> = (0..10).map(|_| rng.next_u64()).collect();
        rng.set_state(saved_state);

        for expected in next_values {
            assert_eq!(rng.next_u64(), expected);
        }
    }
}
