// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes prices used as the reference baseline
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model, the underlying asset follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! A Heston run quotes the Black-Scholes price with σ = √v₀ next to its
//! Monte Carlo estimate. The two agree only when the variance process is
//! flat (ξ = 0, θ = v₀), which makes the gap a rough picture of how much the
//! stochastic variance matters for the contract.

use crate::math_utils::norm_cdf;
use crate::mc::payoffs::OptionKind;

fn d1_d2(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> (f64, f64) {
    let sigma_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    (d1, d1 - sigma_sqrt_t)
}

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
///
/// Undefined (NaN or ±inf) when `sigma` or `t` is zero; see
/// [`reference_price`] for the guarded form.
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

/// Black-Scholes European put option price
///
/// # Formula
/// ```text
/// P(S,K,r,σ,T) = K*e^(-rT)*Φ(-d₂) - S*Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1)
}

/// Reference price for a run, using `σ = √v₀` as a flat volatility proxy.
///
/// With zero volatility the terminal price is deterministic, so the price
/// collapses to the discounted intrinsic value instead of 0/0.
pub fn reference_price(kind: OptionKind, s0: f64, k: f64, r: f64, v0: f64, t: f64) -> f64 {
    let sigma = v0.max(0.0).sqrt();
    if sigma == 0.0 {
        let forward_strike = k * (-r * t).exp();
        return match kind {
            OptionKind::Call => (s0 - forward_strike).max(0.0),
            OptionKind::Put => (forward_strike - s0).max(0.0),
        };
    }
    match kind {
        OptionKind::Call => bs_call_price(s0, k, r, sigma, t),
        OptionKind::Put => bs_put_price(s0, k, r, sigma, t),
    }
}
