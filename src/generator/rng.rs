//! Seed-scoped random source shared by every synthesizer.
//!
//! All content for one task instance is drawn through a single `SeededRng`.
//! Replaying the same sequence of calls after seeding with the same value
//! reproduces the same draws.

use crate::error::GeneratorError;
use crate::generator::Result;
use rand::prelude::*;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_chacha::ChaCha8Rng;
use std::ops::RangeInclusive;

/// Deterministic random number source for one generation call.
pub struct SeededRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRng {
    /// Creates a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a source from ambient entropy.
    ///
    /// The drawn seed is kept, so the resulting instance can still be
    /// regenerated from the seed it reports.
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::rng().random();
        Self::new(seed)
    }

    /// Seeds from `seed` when given, otherwise from entropy.
    pub fn from_optional(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// Re-initializes the stream; subsequent draws depend only on `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in an inclusive range.
    pub fn range(&mut self, range: RangeInclusive<i64>) -> i64 {
        self.rng.random_range(range)
    }

    /// Uniform float in `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random::<f64>() < p
    }

    /// Picks one element of a catalog pool.
    ///
    /// An empty pool means a catalog table is broken, which is reported as an
    /// error rather than papered over.
    pub fn pick<'a, T>(&mut self, pool: &'a [T], what: &str) -> Result<&'a T> {
        pool.choose(&mut self.rng)
            .ok_or_else(|| GeneratorError::EmptyPool(what.to_string()))
    }

    /// Picks one element, or `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
