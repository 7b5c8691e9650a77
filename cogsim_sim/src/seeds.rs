//! Deterministic RNG provider for experiment runs.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Hands out reproducible, independent RNGs for every simulated participant.
///
/// Every participant's randomness is derived from:
/// - Deterministic: same master seed always produces the same streams
/// - Unique: each (condition, participant) pair gets its own stream
/// - Isolated: adding conditions or participants doesn't change existing streams
#[derive(Debug, Clone, Copy)]
pub struct SeedProvider {
    /// Master seed
    master_seed: u64,
}

impl SeedProvider {
    /// Creates a new provider with the given master seed.
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Returns the master seed.
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derives the seed of a condition.
    ///
    /// `master_seed * golden_ratio + condition * prime`
    pub fn condition_seed(&self, condition: usize) -> u64 {
        self.master_seed
            .wrapping_mul(0x9e3779b97f4a7c15) // Golden ratio prime
            .wrapping_add((condition as u64).wrapping_mul(0x517cc1b727220a95))
    }

    /// Returns the RNG of one participant.
    ///
    /// Participants share the condition's seed and differ by ChaCha stream.
    pub fn participant_rng(&self, condition: usize, participant: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.condition_seed(condition));
        rng.set_stream(participant as u64);
        rng
    }

    /// Derives a master seed from the wall clock (for `--seed 0`).
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let mut rng = ChaCha8Rng::seed_from_u64(nanos);
        Self::new(rng.next_u64() | 1)
    }
}
