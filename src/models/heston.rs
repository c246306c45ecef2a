// src/models/heston.rs
//! Heston Stochastic Volatility Model
//!
//! # Mathematical Framework
//!
//! ```text
//! dS_t = r S_t dt + √V_t S_t dW_t^(1)
//! dV_t = κ(θ - V_t) dt + ξ√V_t dW_t^(2)
//! d⟨W^(1), W^(2)⟩_t = ρ dt
//! ```
//!
//! Where:
//! - S_t: Asset price
//! - V_t: Instantaneous variance (volatility squared)
//! - κ: Mean reversion speed for variance
//! - θ: Long-term variance level
//! - ξ: Volatility of variance (vol-of-vol)
//! - ρ: Correlation between the price and variance shocks
//!
//! # Feller Condition
//!
//! ```text
//! 2κθ > ξ²
//! ```
//!
//! When violated the continuous variance can touch zero and the discrete
//! scheme will visit negative values. The simulator tolerates this through
//! full truncation (see [`crate::solvers::milstein`]), so a violation is
//! logged, not rejected.
//!
//! # Discretization
//!
//! Milstein for the variance, Euler in log space for the price, `N` equal
//! steps of `Δt = T/N`.

use crate::error::{validation::*, SdeResult};
use crate::rng::NormalSource;
use crate::solvers::milstein::HestonMilstein;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Model and contract inputs for one run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    pub s0: f64,      // Initial stock price
    pub v0: f64,      // Initial variance
    pub r: f64,       // Risk-free rate
    pub kappa: f64,   // Mean reversion speed
    pub theta: f64,   // Long-term variance
    pub xi: f64,      // Volatility of variance (vol-of-vol)
    pub rho: f64,     // Correlation between stock and variance
    pub t: f64,       // Time to expiry in years
    pub strike: f64,  // Option strike
    pub steps: usize, // Discretization steps per path
}

impl Default for HestonParams {
    fn default() -> Self {
        HestonParams {
            s0: 100.0,
            v0: 0.04,
            r: 0.05,
            kappa: 2.0,
            theta: 0.04,
            xi: 0.3,
            rho: -0.7,
            t: 1.0,
            strike: 100.0,
            steps: 252,
        }
    }
}

impl HestonParams {
    /// Check the invariants every run relies on.
    pub fn validate(&self) -> SdeResult<()> {
        validate_finite("s0", self.s0)?;
        validate_positive("s0", self.s0)?;
        validate_finite("v0", self.v0)?;
        validate_non_negative("v0", self.v0)?;
        validate_finite("r", self.r)?;
        validate_finite("kappa", self.kappa)?;
        validate_non_negative("kappa", self.kappa)?;
        validate_finite("theta", self.theta)?;
        validate_non_negative("theta", self.theta)?;
        validate_finite("xi", self.xi)?;
        validate_non_negative("xi", self.xi)?;
        validate_correlation("rho", self.rho)?;
        validate_finite("t", self.t)?;
        validate_positive("t", self.t)?;
        validate_finite("strike", self.strike)?;
        validate_positive("strike", self.strike)?;
        validate_steps(self.steps)?;
        Ok(())
    }

    /// Whether 2κθ > ξ². Trivially true for a deterministic variance (ξ = 0).
    pub fn feller_satisfied(&self) -> bool {
        self.xi == 0.0 || 2.0 * self.kappa * self.theta > self.xi * self.xi
    }

    pub fn dt(&self) -> f64 {
        self.t / self.steps as f64
    }

    pub fn discount_factor(&self) -> f64 {
        (-self.r * self.t).exp()
    }
}

/// Path simulator for a validated parameter set.
#[derive(Debug, Clone)]
pub struct Heston {
    params: HestonParams,
    stepper: HestonMilstein,
}

impl Heston {
    pub fn new(params: HestonParams) -> SdeResult<Self> {
        Self::new_quiet(params, false)
    }

    pub fn new_quiet(params: HestonParams, suppress_warnings: bool) -> SdeResult<Self> {
        params.validate()?;

        if !suppress_warnings && !params.feller_satisfied() {
            warn!(
                kappa = params.kappa,
                theta = params.theta,
                xi = params.xi,
                two_kappa_theta = 2.0 * params.kappa * params.theta,
                xi_squared = params.xi * params.xi,
                "Feller condition violated (2κθ ≤ ξ²); variance may hit zero"
            );
        }

        Ok(Heston {
            params,
            stepper: HestonMilstein::new(&params),
        })
    }

    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Full trajectory `[S_0, S_1, ..., S_N]`.
    pub fn simulate_path<N: NormalSource + ?Sized>(&self, normals: &mut N) -> Vec<f64> {
        let mut path = Vec::with_capacity(self.params.steps + 1);
        path.push(self.params.s0);

        let mut s = self.params.s0;
        let mut v = self.params.v0;
        for _ in 0..self.params.steps {
            let z_s = normals.next_normal();
            let z_indep = normals.next_normal();
            self.stepper.step(&mut s, &mut v, z_s, z_indep);
            path.push(s);
        }
        path
    }

    /// Terminal price only. Consumes the same draws as [`Self::simulate_path`].
    pub fn simulate_final_price<N: NormalSource + ?Sized>(&self, normals: &mut N) -> f64 {
        let mut s = self.params.s0;
        let mut v = self.params.v0;
        for _ in 0..self.params.steps {
            let z_s = normals.next_normal();
            let z_indep = normals.next_normal();
            self.stepper.step(&mut s, &mut v, z_s, z_indep);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{BoxMuller, ScriptedNormals};
    use approx::assert_relative_eq;

    fn three_step_params() -> HestonParams {
        HestonParams {
            s0: 100.0,
            v0: 0.04,
            r: 0.05,
            kappa: 2.0,
            theta: 0.04,
            xi: 0.3,
            rho: -0.7,
            t: 1.0,
            strike: 100.0,
            steps: 3,
        }
    }

    #[test]
    fn test_golden_three_step_path() {
        let heston = Heston::new(three_step_params()).expect("Valid parameters");
        let mut normals = ScriptedNormals::new(vec![0.5, -1.0, 1.2, 0.3, -0.8, 2.0]);

        let path = heston.simulate_path(&mut normals);

        let expected = [
            100.0,
            107.00817280573993,
            113.68230410612826,
            108.63197334269286,
        ];
        assert_eq!(path.len(), 4);
        for (got, want) in path.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 1e-9);
        }
        assert_eq!(normals.consumed(), 6);
    }

    #[test]
    fn test_golden_path_through_negative_variance() {
        // Variance goes negative after the first step; later steps see v⁺ = 0
        // and the price only earns the risk-free drift.
        let params = HestonParams {
            s0: 100.0,
            v0: 0.01,
            r: 0.02,
            kappa: 1.0,
            theta: 0.01,
            xi: 0.5,
            rho: 0.0,
            t: 1.0,
            strike: 100.0,
            steps: 3,
        };
        let heston = Heston::new_quiet(params, true).expect("Valid parameters");
        let mut normals = ScriptedNormals::new(vec![0.0, -1.0, 1.5, 0.0, 0.4, 0.2]);

        let path = heston.simulate_path(&mut normals);

        let expected = [
            100.0,
            100.5012520859401,
            101.17349876564471,
            101.85024206194856,
        ];
        for (got, want) in path.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_final_price_matches_path_terminal() {
        let heston = Heston::new(HestonParams::default()).expect("Valid parameters");

        let mut a = BoxMuller::new(99);
        let mut b = BoxMuller::new(99);
        let path = heston.simulate_path(&mut a);
        let terminal = heston.simulate_final_price(&mut b);

        assert_eq!(path.len(), HestonParams::default().steps + 1);
        assert_eq!(*path.last().expect("non-empty path"), terminal);
    }

    #[test]
    fn test_zero_vol_of_vol_constant_variance_path() {
        // ξ = 0, θ = v0: variance stays put and the path is GBM-like.
        let params = HestonParams {
            xi: 0.0,
            theta: 0.04,
            v0: 0.04,
            steps: 2,
            ..three_step_params()
        };
        let heston = Heston::new(params).expect("Valid parameters");
        let mut normals = ScriptedNormals::new(vec![1.0, 0.0, -1.0, 0.0]);
        let path = heston.simulate_path(&mut normals);

        let dt: f64 = 0.5;
        let step = |z: f64| ((0.05 - 0.02) * dt + z * (0.04 * dt).sqrt()).exp();
        assert_relative_eq!(path[1], 100.0 * step(1.0), max_relative = 1e-12);
        assert_relative_eq!(path[2], 100.0 * step(1.0) * step(-1.0), max_relative = 1e-12);
    }

    #[test]
    fn test_feller_condition() {
        let mut params = HestonParams::default();
        assert!(params.feller_satisfied());

        params.kappa = 1.0;
        params.xi = 1.0;
        assert!(!params.feller_satisfied());

        // Should create despite the violation
        let _heston = Heston::new(params).expect("Should create despite Feller violation");
    }

    #[test]
    fn test_invalid_parameters() {
        let bad_rho = HestonParams {
            rho: 1.5,
            ..HestonParams::default()
        };
        assert!(Heston::new(bad_rho).is_err());

        let bad_spot = HestonParams {
            s0: -100.0,
            ..HestonParams::default()
        };
        assert!(Heston::new(bad_spot).is_err());

        let bad_xi = HestonParams {
            xi: -0.3,
            ..HestonParams::default()
        };
        assert!(Heston::new(bad_xi).is_err());

        let zero_steps = HestonParams {
            steps: 0,
            ..HestonParams::default()
        };
        assert!(Heston::new(zero_steps).is_err());

        let zero_expiry = HestonParams {
            t: 0.0,
            ..HestonParams::default()
        };
        assert!(Heston::new(zero_expiry).is_err());

        let nan_rate = HestonParams {
            r: f64::NAN,
            ..HestonParams::default()
        };
        assert!(Heston::new(nan_rate).is_err());
    }

    #[test]
    fn test_params_serde_round_trip() {
        let params = three_step_params();
        let json = serde_json::to_string(&params).expect("serializable");
        let back: HestonParams = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(params, back);
    }
}
