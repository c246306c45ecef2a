// src/rng.rs
//! Random Number Generation for the Heston simulator
//!
//! # Linear Congruential Generator
//!
//! The default source is a 31-bit LCG with the classic ANSI C constants:
//! ```text
//! seed = (seed * 1103515245 + 12345) mod 2^31
//! u    = seed / (2^31 - 1)
//! ```
//! It is fast and portable, not cryptographically secure, and its only
//! job is to feed the Box-Muller transform below.
//!
//! # Box-Muller Transform
//!
//! Converts two uniforms into two independent normals:
//! ```text
//! Z₁ = √(-2ln(U₁)) * sin(2πU₂)
//! Z₂ = √(-2ln(U₁)) * cos(2πU₂)
//! ```
//! Z₁ is returned immediately and Z₂ is cached as the spare for the next
//! call. Reseeding drops any pending spare.
//!
//! # Injecting draws
//!
//! The simulator only sees the [`NormalSource`] trait, so tests can swap in
//! [`ScriptedNormals`] to replay a fixed draw sequence, and callers who want
//! a stronger generator can use [`DistrNormals`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LCG_MASK: u64 = 0x7fff_ffff;

/// A stream of standard normal draws that can be restarted from a seed.
pub trait NormalSource {
    fn next_normal(&mut self) -> f64;

    /// Restart the stream. Any cached state derived from the old seed is
    /// discarded.
    fn reseed(&mut self, seed: u64);
}

/// 31-bit linear congruential generator
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.state = seed;
    }

    /// Advance the state and return it as a fraction of 2^31 - 1.
    pub fn next_uniform(&mut self) -> f64 {
        // Wrapping mod 2^64 then masking equals arithmetic mod 2^31.
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT)
            & LCG_MASK;
        self.state as f64 / LCG_MASK as f64
    }
}

/// Box-Muller normal generator over an [`Lcg`], with one cached spare.
#[derive(Debug, Clone)]
pub struct BoxMuller {
    lcg: Lcg,
    spare: Option<f64>,
}

impl BoxMuller {
    pub fn new(seed: u64) -> Self {
        Self {
            lcg: Lcg::new(seed),
            spare: None,
        }
    }

    pub fn has_spare(&self) -> bool {
        self.spare.is_some()
    }
}

impl Default for BoxMuller {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NormalSource for BoxMuller {
    fn next_normal(&mut self) -> f64 {
        if let Some(spare) = self.spare.take() {
            return spare;
        }

        // u = 0 would give ln(0) = -inf
        let u = self.lcg.next_uniform().max(f64::MIN_POSITIVE);
        let v = self.lcg.next_uniform();

        let mag = (-2.0 * u.ln()).sqrt();
        let angle = 2.0 * PI * v;
        self.spare = Some(mag * angle.cos());
        mag * angle.sin()
    }

    fn reseed(&mut self, seed: u64) {
        self.lcg.reseed(seed);
        self.spare = None;
    }
}

/// Normal draws from `StdRng` through `rand_distr::StandardNormal`.
#[derive(Debug, Clone)]
pub struct DistrNormals {
    rng: StdRng,
}

impl DistrNormals {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seed_rng_from_u64(seed),
        }
    }
}

impl Default for DistrNormals {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NormalSource for DistrNormals {
    fn next_normal(&mut self) -> f64 {
        get_normal_draw(&mut self.rng)
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = seed_rng_from_u64(seed);
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// Reseeding rewinds to the first draw; the seed value itself is ignored.
/// An empty script yields zeros.
#[derive(Debug, Clone, Default)]
pub struct ScriptedNormals {
    draws: Vec<f64>,
    pos: usize,
}

impl ScriptedNormals {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, pos: 0 }
    }

    /// Number of draws consumed since the last rewind.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl NormalSource for ScriptedNormals {
    fn next_normal(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let z = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        z
    }

    fn reseed(&mut self, _seed: u64) {
        self.pos = 0;
    }
}

/// Seed derived from the wall clock, in whole seconds.
pub fn time_seed() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lcg_first_values() {
        let mut lcg = Lcg::new(1);
        // 1 * 1103515245 + 12345 = 1103527590 < 2^31
        assert_relative_eq!(lcg.next_uniform(), 1_103_527_590.0 / 2_147_483_647.0);

        let mut lcg = Lcg::new(0);
        assert_relative_eq!(lcg.next_uniform(), 12_345.0 / 2_147_483_647.0);
    }

    #[test]
    fn test_lcg_reproducibility() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_uniform(), b.next_uniform());
        }
    }

    #[test]
    fn test_lcg_large_seed_matches_masked_seed() {
        // Only the low 31 bits of the state influence the next value.
        let mut wide = Lcg::new((1u64 << 40) + 7);
        let mut narrow = Lcg::new(7);
        assert_eq!(wide.next_uniform(), narrow.next_uniform());
    }

    #[test]
    fn test_lcg_range() {
        let mut lcg = Lcg::new(12345);
        for _ in 0..10_000 {
            let u = lcg.next_uniform();
            assert!((0.0..=1.0).contains(&u));
        }
    }

    #[test]
    fn test_box_muller_pair_shares_uniforms() {
        let mut bm = BoxMuller::new(2024);
        let mut lcg = Lcg::new(2024);

        let z1 = bm.next_normal();
        assert!(bm.has_spare());
        let z2 = bm.next_normal();
        assert!(!bm.has_spare());

        let u = lcg.next_uniform();
        let v = lcg.next_uniform();
        let mag = (-2.0 * u.ln()).sqrt();
        assert_relative_eq!(z1, mag * (2.0 * PI * v).sin(), max_relative = 1e-12);
        assert_relative_eq!(z2, mag * (2.0 * PI * v).cos(), max_relative = 1e-12);
    }

    #[test]
    fn test_reseed_discards_spare() {
        let mut bm = BoxMuller::new(7);
        let first = bm.next_normal();
        assert!(bm.has_spare());

        bm.reseed(7);
        assert!(!bm.has_spare());
        assert_eq!(bm.next_normal(), first);
    }

    #[test]
    fn test_normal_distribution() {
        let mut bm = BoxMuller::new(42);

        let samples: Vec<f64> = (0..20_000).map(|_| bm.next_normal()).collect();

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;

        assert!(mean.abs() < 0.05, "Mean should be close to 0, got {}", mean);
        assert!(
            (variance - 1.0).abs() < 0.05,
            "Variance should be close to 1, got {}",
            variance
        );
    }

    #[test]
    fn test_distr_normals_reseed_restarts_stream() {
        let mut src = DistrNormals::new(9);
        let a: Vec<f64> = (0..5).map(|_| src.next_normal()).collect();
        src.reseed(9);
        let b: Vec<f64> = (0..5).map(|_| src.next_normal()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scripted_normals_cycle_and_rewind() {
        let mut src = ScriptedNormals::new(vec![0.5, -1.0, 2.0]);
        let drawn: Vec<f64> = (0..5).map(|_| src.next_normal()).collect();
        assert_eq!(drawn, vec![0.5, -1.0, 2.0, 0.5, -1.0]);
        assert_eq!(src.consumed(), 5);

        src.reseed(123);
        assert_eq!(src.consumed(), 0);
        assert_eq!(src.next_normal(), 0.5);

        let mut empty = ScriptedNormals::default();
        assert_eq!(empty.next_normal(), 0.0);
    }
}
