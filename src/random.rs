//! Injectable randomness for particle spawning.
//!
//! The starfield draws every random number through [`RandomSource`], so a
//! test can swap the entropy-seeded generator for a fixed sequence:
//!
//! ```ignore
//! // Production: different sky every run
//! let field = Starfield::new(StarfieldConfig::default(), EntropyRandom::new());
//!
//! // Tests: always spawn a comet, always from the left edge
//! let field = Starfield::new(config, ScriptedRandom::new(vec![0.0, 0.25]));
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed numbers.
pub trait RandomSource {
    /// Next value in `[0.0, 1.0)`.
    fn next_f32(&mut self) -> f32;

    /// Value in `[min, max)`. Returns `min` when the range is empty.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f32()
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

/// Generator seeded from OS entropy: a new sky every run.
#[derive(Debug, Clone)]
pub struct EntropyRandom {
    rng: SmallRng,
}

impl EntropyRandom {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.rng.gen()
    }
}

/// Generator with a fixed seed, reproducible across runs.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.rng.gen()
    }
}

/// Replays a fixed list of values, cycling when it runs out.
///
/// Values are clamped into `[0.0, 1.0)`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns the same value.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }
}
