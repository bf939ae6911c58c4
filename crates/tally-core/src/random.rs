//! Injectable randomness
//!
//! Everything random in the chat (which canned reply, how long to "think",
//! whether to ask a follow-up) goes through [`RandomSource::pick`], so tests
//! can force a deterministic outcome.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed indices
pub trait RandomSource {
    /// Pick an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

/// Thread-local OS-seeded randomness
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len.max(1))
    }
}

/// Reproducible randomness from a fixed seed
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len.max(1))
    }
}

/// Replays a fixed script of picks, wrapping each into range
///
/// Cycles when the script runs out; an empty script always picks 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    script: Vec<usize>,
    position: usize,
}

impl ScriptedRandom {
    pub fn new(script: impl Into<Vec<usize>>) -> Self {
        Self {
            script: script.into(),
            position: 0,
        }
    }

    /// Always pick the same index (clamped to the range)
    pub fn always(index: usize) -> Self {
        Self::new(vec![index])
    }
}

impl RandomSource for ScriptedRandom {
    fn pick(&mut self, len: usize) -> usize {
        let len = len.max(1);
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.position % self.script.len()];
        self.position += 1;
        value.min(len - 1)
    }
}

/// Roll a percentage chance: true with probability `percent / 100`
pub fn chance(rng: &mut dyn RandomSource, percent: u32) -> bool {
    (rng.pick(100) as u32) < percent.min(100)
}
