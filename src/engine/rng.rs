//! Axis permutation generation.
//!
//! Deterministic when seeded: the same seed always yields the same pair of
//! axes, which keeps game-start reproducible in tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::Axis;

/// Seedable RNG for axis shuffles.
///
/// Uses ChaCha8 for speed while maintaining cryptographic quality
/// randomness.
#[derive(Clone, Debug)]
pub struct PoolRng {
    inner: ChaCha8Rng,
}

impl PoolRng {
    /// Create a deterministic RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an RNG seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Produce a uniformly random permutation of the digits 0-9.
    ///
    /// In-place unbiased shuffle: iterate `i` from 9 down to 1, draw a
    /// uniform `j` in [0, i], swap. Each of the 10! orderings is equally
    /// likely.
    pub fn random_axis(&mut self) -> Axis {
        let mut digits: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        for i in (1..digits.len()).rev() {
            let j = self.inner.gen_range(0..=i);
            digits.swap(i, j);
        }
        Axis::new(digits)
    }
}
