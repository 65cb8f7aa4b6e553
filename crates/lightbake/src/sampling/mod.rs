//! Random streams and the Monte Carlo helpers the light models sample with.

mod monte_carlo;

#[cfg(test)]
mod tests;

pub use monte_carlo::*;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic per-task random stream. Each worker owns its own.
#[derive(Clone, Debug)]
pub struct RandomStream {
    rng: ChaCha8Rng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        RandomStream { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Uniform in [0, 1).
    pub fn fraction(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform integer in [0, count).
    pub fn index(&mut self, count: usize) -> usize {
        debug_assert!(count > 0);
        self.rng.random_range(0..count)
    }
}
