//! Seeded randomness: uniform bands, rounding, and per-component seed management.
//!
//! Every generator takes an injected `R: Rng + ?Sized`, so tests pass a
//! `StdRng::seed_from_u64(..)` and the CLI derives one rng per component from a
//! single global seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Round `value` to `decimals` decimal places (half away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Draw uniformly from the closed interval `[lo, hi]` and round the result.
///
/// Bounds given in reverse order are swapped; equal bounds return that value.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64, decimals: u32) -> f64 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let raw = if lo == hi { lo } else { rng.gen_range(lo..=hi) };
    round_to(raw, decimals)
}

/// A closed sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Sample the band, rounded to `decimals` places.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, decimals: u32) -> f64 {
        uniform(rng, self.min, self.max, decimals)
    }

    /// Sample the band shifted by `origin` (used for offsets around a value).
    pub fn sample_around<R: Rng + ?Sized>(&self, rng: &mut R, origin: f64, decimals: u32) -> f64 {
        uniform(rng, origin + self.min, origin + self.max, decimals)
    }

    /// Sample whole milliseconds.
    pub fn sample_millis<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        uniform(rng, self.min, self.max, 0).max(0.0) as u64
    }

    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Lower bound as it can appear after rounding a sample to `decimals`.
    pub fn rounded_min(&self, decimals: u32) -> f64 {
        round_to(self.min, decimals)
    }

    /// Upper bound as it can appear after rounding a sample to `decimals`.
    pub fn rounded_max(&self, decimals: u32) -> f64 {
        round_to(self.max, decimals)
    }
}

/// Build a deterministic rng from a seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Seed manager for reproducible demo runs.
///
/// Component seeds are derived from the global seed by hashing the component
/// name, so adding a component never shifts the seeds of the others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedManager {
    pub global_seed: u64,
    pub component_seeds: HashMap<String, u64>,
}

impl SeedManager {
    pub fn new(global_seed: u64) -> Self {
        Self {
            global_seed,
            component_seeds: HashMap::new(),
        }
    }

    /// Seed manager with a global seed drawn from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    pub fn get_seed(&mut self, component: &str) -> u64 {
        let global = self.global_seed;
        *self
            .component_seeds
            .entry(component.to_string())
            .or_insert_with(|| derive_seed(global, component))
    }

    /// Fresh rng for `component`. Calling twice yields identical streams.
    pub fn rng_for(&mut self, component: &str) -> StdRng {
        seeded(self.get_seed(component))
    }
}

fn derive_seed(global: u64, component: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global.to_le_bytes());
    hasher.update(b":");
    hasher.update(component.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(97.456, 2), 97.46);
        assert_eq!(round_to(3.14159, 4), 3.1416);
        assert_eq!(round_to(5812.4, 0), 5812.0);
    }

    #[test]
    fn test_uniform_stays_in_band() {
        let mut rng = seeded(7);
        for _ in 0..1000 {
            let v = uniform(&mut rng, 92.0, 97.5, 2);
            assert!((92.0..=97.5).contains(&v), "out of band: {v}");
        }
    }

    #[test]
    fn test_uniform_swapped_and_degenerate_bounds() {
        let mut rng = seeded(1);
        let v = uniform(&mut rng, 10.0, 2.0, 2);
        assert!((2.0..=10.0).contains(&v));
        assert_eq!(uniform(&mut rng, 4.25, 4.25, 2), 4.25);
    }

    #[test]
    fn test_band_sample_around() {
        let band = Band::new(-0.8, 0.2);
        let mut rng = seeded(3);
        for _ in 0..200 {
            let v = band.sample_around(&mut rng, 98.0, 2);
            assert!((97.2..=98.2).contains(&v));
        }
    }

    #[test]
    fn test_band_well_formed() {
        assert!(Band::new(1.0, 2.0).is_well_formed());
        assert!(!Band::new(2.0, 1.0).is_well_formed());
        assert!(!Band::new(f64::NAN, 1.0).is_well_formed());
    }

    #[test]
    fn test_seed_manager_is_stable() {
        let mut a = SeedManager::new(42);
        let mut b = SeedManager::new(42);
        assert_eq!(a.get_seed("load"), b.get_seed("load"));
        assert_ne!(a.get_seed("load"), a.get_seed("unlearn"));
        // cached value is returned on the second lookup
        let first = a.get_seed("predict");
        assert_eq!(a.get_seed("predict"), first);
    }

    #[test]
    fn test_seed_manager_rng_streams_repeat() {
        let mut seeds = SeedManager::new(9);
        let mut r1 = seeds.rng_for("load");
        let mut r2 = seeds.rng_for("load");
        assert_eq!(uniform(&mut r1, 0.0, 1.0, 6), uniform(&mut r2, 0.0, 1.0, 6));
    }
}
