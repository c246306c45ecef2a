// src/solvers/milstein.rs
//! Milstein Scheme for the Heston Variance Process
//!
//! # Mathematical Framework
//!
//! For a scalar SDE `dX = a dt + b dW` the Milstein scheme adds the Itô
//! correction `½ b b' [(ΔW)² - Δt]` to the Euler step. For the CIR-type
//! variance `b(v) = ξ√v`, so `½ b b' = ξ²/4` and the step becomes
//! ```text
//! v_{n+1} = v_n + κ(θ - v⁺)Δt + ξ√(v⁺Δt) Z_v + ξ²/4 (Z_v² - 1) Δt
//! ```
//! with `v⁺ = max(v_n, 0)` (full truncation).
//!
//! The log-price takes an Euler step driven by the *previous* variance:
//! ```text
//! S_{n+1} = S_n exp((r - v⁺/2)Δt + √(v⁺Δt) Z_S)
//! ```
//!
//! # Correlation
//!
//! Two independent draws per step, `Z_S` first, then
//! `Z_v = ρ Z_S + √(1-ρ²) Z_⊥`.
//!
//! # Full truncation
//!
//! The stored variance may go negative. It is clamped only where it is
//! consumed (the square roots and both drifts), never overwritten.

use crate::models::heston::HestonParams;

/// Per-run constants of the Heston Milstein step.
#[derive(Debug, Clone, Copy)]
pub struct HestonMilstein {
    r: f64,
    kappa: f64,
    theta: f64,
    xi: f64,
    rho: f64,
    rho_bar: f64,
    dt: f64,
}

impl HestonMilstein {
    pub fn new(params: &HestonParams) -> Self {
        Self {
            r: params.r,
            kappa: params.kappa,
            theta: params.theta,
            xi: params.xi,
            rho: params.rho,
            rho_bar: (1.0 - params.rho * params.rho).sqrt(),
            dt: params.dt(),
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Advance `(s, v)` by one step given the two independent normal draws.
    ///
    /// The price update reads the variance from *before* this step's update.
    pub fn step(&self, s: &mut f64, v: &mut f64, z_s: f64, z_indep: f64) {
        let dt = self.dt;
        let z_v = self.rho * z_s + self.rho_bar * z_indep;

        let v_prev = (*v).max(0.0);
        let sqrt_v_dt = (v_prev * dt).sqrt();

        *v += self.kappa * (self.theta - v_prev) * dt
            + z_v * self.xi * sqrt_v_dt
            + 0.25 * self.xi * self.xi * (z_v * z_v - 1.0) * dt;

        *s *= ((self.r - 0.5 * v_prev) * dt + z_s * sqrt_v_dt).exp();
    }
}
