//! # heston-mc: Incremental Monte Carlo under Heston
//!
//! Prices a European option under the Heston stochastic-volatility model
//! one batch of paths at a time, so the estimate can be watched while it
//! converges. The first cohort of paths is kept in full and five of them
//! (min, 25th, 50th, 75th percentile and max by terminal price) are exposed
//! for plotting. A Black-Scholes price with σ = √v₀ is reported alongside
//! as a baseline.
//!
//! ## Quick Start
//!
//! ```rust
//! use heston_mc::mc::mc_engine::{SimulationConfig, SimulationRun};
//! use heston_mc::models::heston::HestonParams;
//!
//! let params = HestonParams {
//!     s0: 100.0,
//!     v0: 0.04,
//!     r: 0.05,
//!     kappa: 2.0,
//!     theta: 0.04,
//!     xi: 0.3,
//!     rho: -0.7,
//!     t: 1.0,
//!     strike: 100.0,
//!     steps: 50,
//! };
//! let config = SimulationConfig {
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut run = SimulationRun::new(params, config).expect("Valid parameters");
//! while run.simulation_count() < 2_000 {
//!     run.run_batch(500);
//!     println!(
//!         "{:>6} sims: {:.4} ± {:.4} (BS {:.4})",
//!         run.simulation_count(),
//!         run.option_price(),
//!         run.standard_error(),
//!         run.black_scholes_price()
//!     );
//! }
//!
//! let median = run.percentile_path(50).expect("tracking phase is over");
//! assert_eq!(median.len(), 51);
//! ```
//!
//! ## Discretization
//!
//! Variance follows a Milstein step with full truncation; the price takes a
//! log-Euler step driven by the variance from the start of the step. See
//! [`solvers::milstein`].

// Module declarations
pub mod analytics;
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod output;
pub mod rng;
pub mod solvers;

// Re-export commonly used types for convenience
pub use error::{SdeError, SdeResult};
pub use mc::mc_engine::{Phase, RunSummary, SimulationConfig, SimulationRun};
pub use mc::payoffs::OptionKind;
pub use mc::percentiles::{Percentile, PricePath};
pub use models::heston::HestonParams;
