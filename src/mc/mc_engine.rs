// src/mc/mc_engine.rs
//! Incremental Monte Carlo driver
//!
//! A [`SimulationRun`] prices one European option under Heston a batch at
//! a time, so a caller can watch the estimate converge.
//!
//! # Phases
//!
//! ```text
//! TRACKING ──(simulation_count == tracking_limit)──▶ FAST
//! ```
//!
//! - **Tracking**: every path is simulated in full. Up to `path_capacity`
//!   of them are kept for percentile selection; the rest only contribute
//!   their payoff.
//! - **Fast**: only the terminal price is simulated.
//!
//! The transition fires once, inside whichever batch produces simulation
//! number `tracking_limit`, independent of how the batches are sized.
//!
//! # Estimator
//!
//! ```text
//! price = e^(-rT) * Σ payoff / n
//! ```
//! recomputed from the running sums after every batch. The sum of squared
//! payoffs is tracked as well for the standard error.
//!
//! # Sharing
//!
//! A run is a plain owned value. Callers that drive it from several threads
//! must put the whole run behind one lock: `run_batch` updates the count,
//! the sums and the cohort together and a reader in between would see them
//! out of step.

use crate::analytics::bs_analytic;
use crate::error::{validation::*, SdeResult};
use crate::mc::payoffs::OptionKind;
use crate::mc::percentiles::{Cohort, Percentile, PercentileIndices, PricePath};
use crate::models::heston::{Heston, HestonParams};
use crate::rng::{self, BoxMuller, NormalSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

pub const DEFAULT_TRACKING_LIMIT: usize = 1000;
pub const DEFAULT_PATH_CAPACITY: usize = 1000;
/// Bound on both `tracking_limit` and `path_capacity`
pub const MAX_TRACKED_PATHS: usize = 10_000_000;

/// Driver settings that are not part of the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of simulations run with full paths before switching to fast mode
    pub tracking_limit: usize,
    /// Maximum number of full paths kept for percentile selection
    pub path_capacity: usize,
    /// Fixed seed for reproducible runs; `None` seeds from the wall clock
    pub seed: Option<u64>,
    pub option: OptionKind,
}

impl SimulationConfig {
    pub fn validate(&self) -> SdeResult<()> {
        validate_at_most("tracking_limit", self.tracking_limit, MAX_TRACKED_PATHS)?;
        validate_at_most("path_capacity", self.path_capacity, MAX_TRACKED_PATHS)?;
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tracking_limit: DEFAULT_TRACKING_LIMIT,
            path_capacity: DEFAULT_PATH_CAPACITY,
            seed: None,
            option: OptionKind::Call,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Tracking,
    Fast,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Phase::Tracking => "tracking",
            Phase::Fast => "fast",
        })
    }
}

/// Point-in-time view of a run's estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub simulations: u64,
    pub price: f64,
    pub std_error: f64,
    pub black_scholes: f64,
    pub phase: Phase,
    pub paths_stored: usize,
}

/// State of one pricing run, from `initialize` to the next `initialize`.
pub struct SimulationRun<S: NormalSource = BoxMuller> {
    config: SimulationConfig,
    model: Heston,
    normals: S,
    seed: u64,

    simulation_count: u64,
    phase: Phase,
    cohort: Cohort,

    payoff_sum: f64,
    payoff_sq_sum: f64,
    option_price: f64,
    black_scholes_price: f64,
    non_finite_paths: u64,
}

impl SimulationRun<BoxMuller> {
    /// Run driven by the Box-Muller LCG source.
    pub fn new(params: HestonParams, config: SimulationConfig) -> SdeResult<Self> {
        Self::with_source(params, config, BoxMuller::default())
    }
}

impl<S: NormalSource> SimulationRun<S> {
    /// Run driven by a caller-supplied normal source. The source is reseeded
    /// on every `initialize`.
    pub fn with_source(
        params: HestonParams,
        config: SimulationConfig,
        normals: S,
    ) -> SdeResult<Self> {
        config.validate()?;
        let model = Heston::new(params)?;
        let cohort = Cohort::with_capacity(config.path_capacity);

        let mut run = SimulationRun {
            config,
            model,
            normals,
            seed: 0,
            simulation_count: 0,
            phase: Phase::Tracking,
            cohort,
            payoff_sum: 0.0,
            payoff_sq_sum: 0.0,
            option_price: 0.0,
            black_scholes_price: 0.0,
            non_finite_paths: 0,
        };
        run.reset();
        Ok(run)
    }

    /// Start a fresh run with new parameters, keeping the driver settings.
    ///
    /// On error the previous run is left untouched.
    pub fn initialize(&mut self, params: HestonParams) -> SdeResult<()> {
        self.model = Heston::new(params)?;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        let params = *self.model.params();

        self.seed = self.config.seed.unwrap_or_else(rng::time_seed);
        self.normals.reseed(self.seed);

        self.cohort = Cohort::with_capacity(self.config.path_capacity);
        self.simulation_count = 0;
        self.phase = Phase::Tracking;
        self.payoff_sum = 0.0;
        self.payoff_sq_sum = 0.0;
        self.option_price = 0.0;
        self.non_finite_paths = 0;
        self.black_scholes_price = bs_analytic::reference_price(
            self.config.option,
            params.s0,
            params.strike,
            params.r,
            params.v0,
            params.t,
        );

        info!(
            s0 = params.s0,
            v0 = params.v0,
            r = params.r,
            kappa = params.kappa,
            theta = params.theta,
            xi = params.xi,
            rho = params.rho,
            t = params.t,
            strike = params.strike,
            steps = params.steps,
            option = %self.config.option,
            seed = self.seed,
            black_scholes = self.black_scholes_price,
            "simulation run initialized"
        );

        if self.config.tracking_limit == 0 {
            self.end_tracking();
        }
    }

    /// Advance the run by `batch_size` simulations. Zero or negative sizes
    /// do nothing.
    pub fn run_batch(&mut self, batch_size: i64) {
        if batch_size <= 0 {
            return;
        }

        for _ in 0..batch_size {
            match self.phase {
                Phase::Tracking => self.simulate_tracked(),
                Phase::Fast => self.simulate_fast(),
            }
        }

        self.option_price = self.estimate();

        debug!(
            simulations = self.simulation_count,
            price = self.option_price,
            std_error = self.standard_error(),
            phase = %self.phase,
            "batch complete"
        );
    }

    fn simulate_tracked(&mut self) {
        let path = PricePath::new(self.model.simulate_path(&mut self.normals));
        let terminal = path.terminal();
        self.cohort.push(path);
        self.record(terminal);

        if self.simulation_count >= self.config.tracking_limit as u64 {
            self.end_tracking();
        }
    }

    fn simulate_fast(&mut self) {
        let terminal = self.model.simulate_final_price(&mut self.normals);
        self.record(terminal);
    }

    fn record(&mut self, terminal: f64) {
        if !terminal.is_finite() {
            self.non_finite_paths += 1;
            if self.non_finite_paths == 1 {
                warn!(
                    terminal,
                    simulation = self.simulation_count + 1,
                    "non-finite terminal price; the estimate is no longer reliable"
                );
            }
        }

        let payoff = self
            .config
            .option
            .payoff(terminal, self.model.params().strike);
        self.payoff_sum += payoff;
        self.payoff_sq_sum += payoff * payoff;
        self.simulation_count += 1;
    }

    fn end_tracking(&mut self) {
        self.phase = Phase::Fast;
        match self.cohort.finalize() {
            Some(idx) => {
                let terminal = |i: usize| self.cohort.paths()[i].terminal();
                info!(
                    simulations = self.simulation_count,
                    paths_stored = self.cohort.len(),
                    min = terminal(idx.min),
                    p25 = terminal(idx.p25),
                    p50 = terminal(idx.p50),
                    p75 = terminal(idx.p75),
                    max = terminal(idx.max),
                    "tracking phase complete"
                );
            }
            None => {
                info!(
                    simulations = self.simulation_count,
                    "tracking phase complete with no stored paths"
                );
            }
        }
    }

    fn estimate(&self) -> f64 {
        if self.simulation_count == 0 {
            return 0.0;
        }
        self.model.params().discount_factor() * (self.payoff_sum / self.simulation_count as f64)
    }

    /// Standard error of the discounted price estimate; 0 below two samples.
    pub fn standard_error(&self) -> f64 {
        if self.simulation_count < 2 {
            return 0.0;
        }
        let n = self.simulation_count as f64;
        let mean = self.payoff_sum / n;
        let sample_var = ((self.payoff_sq_sum - n * mean * mean) / (n - 1.0)).max(0.0);
        self.model.params().discount_factor() * (sample_var / n).sqrt()
    }

    pub fn simulation_count(&self) -> u64 {
        self.simulation_count
    }

    /// Discounted Monte Carlo estimate as of the last batch; 0 before any
    /// simulation has run.
    pub fn option_price(&self) -> f64 {
        self.option_price
    }

    pub fn black_scholes_price(&self) -> f64 {
        self.black_scholes_price
    }

    pub fn time_steps(&self) -> usize {
        self.model.params().steps
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_tracking_phase(&self) -> bool {
        self.phase == Phase::Tracking
    }

    /// Full path at percentile 0, 25, 50, 75 or 100.
    ///
    /// `None` while tracking, when no paths were stored, or for any other
    /// percentile value.
    pub fn percentile_path(&self, percentile: i64) -> Option<&[f64]> {
        let p = Percentile::from_value(percentile)?;
        self.percentile(p).map(PricePath::prices)
    }

    pub fn percentile(&self, p: Percentile) -> Option<&PricePath> {
        if self.phase != Phase::Fast {
            return None;
        }
        self.cohort.path(p)
    }

    pub fn percentile_terminal(&self, p: Percentile) -> Option<f64> {
        self.percentile(p).map(PricePath::terminal)
    }

    /// All five percentile paths in ascending order, once available.
    pub fn percentile_paths(&self) -> Option<Vec<(Percentile, &[f64])>> {
        Percentile::ALL
            .iter()
            .map(|&p| self.percentile(p).map(|path| (p, path.prices())))
            .collect()
    }

    pub fn percentile_indices(&self) -> Option<PercentileIndices> {
        if self.phase != Phase::Fast {
            return None;
        }
        self.cohort.indices()
    }

    pub fn paths_stored(&self) -> usize {
        self.cohort.len()
    }

    /// Stored cohort; sorted by terminal price once tracking has ended.
    pub fn stored_paths(&self) -> &[PricePath] {
        self.cohort.paths()
    }

    pub fn non_finite_paths(&self) -> u64 {
        self.non_finite_paths
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &HestonParams {
        self.model.params()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            simulations: self.simulation_count,
            price: self.option_price,
            std_error: self.standard_error(),
            black_scholes: self.black_scholes_price,
            phase: self.phase,
            paths_stored: self.cohort.len(),
        }
    }
}
