//! Randomness used by the forecast loops.
//!
//! All jitter and spike draws go through [`NoiseSource`] so callers can pick
//! a seeded generator for reproducible output or switch randomness off.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of forecast perturbations.
pub trait NoiseSource: Send {
    /// Uniform value in `[-amplitude, amplitude)`.
    fn uniform(&mut self, amplitude: f64) -> f64;

    /// With `probability`, a value in `[0, max)`; otherwise 0.
    fn spike(&mut self, probability: f64, max: f64) -> f64;
}

/// PRNG-backed noise.
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl NoiseSource for SeededNoise {
    fn uniform(&mut self, amplitude: f64) -> f64 {
        if !amplitude.is_finite() || amplitude <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-amplitude..amplitude)
    }

    fn spike(&mut self, probability: f64, max: f64) -> f64 {
        if self.rng.gen::<f64>() >= probability || !max.is_finite() || max <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..max)
    }
}

/// No perturbation at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn uniform(&mut self, _amplitude: f64) -> f64 {
        0.0
    }

    fn spike(&mut self, _probability: f64, _max: f64) -> f64 {
        0.0
    }
}

/// Constant perturbation, for pinning exact outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNoise {
    pub jitter: f64,
    pub spike: f64,
}

impl NoiseSource for FixedNoise {
    fn uniform(&mut self, _amplitude: f64) -> f64 {
        self.jitter
    }

    fn spike(&mut self, _probability: f64, _max: f64) -> f64 {
        self.spike
    }
}
