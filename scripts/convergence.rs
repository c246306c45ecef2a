// scripts/convergence.rs
use clap::Parser;
use heston_mc::math_utils::Timer;
use heston_mc::mc::mc_engine::{RunSummary, SimulationConfig, SimulationRun};
use heston_mc::mc::payoffs::OptionKind;
use heston_mc::mc::percentiles::Percentile;
use heston_mc::models::heston::HestonParams;
use heston_mc::output;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Drive a Heston Monte Carlo run batch by batch and report convergence.
#[derive(Parser, Debug)]
#[command(name = "heston-convergence", version)]
struct Args {
    /// JSON file with `params` and/or `config` objects
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    s0: Option<f64>,
    #[arg(long)]
    v0: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    r: Option<f64>,
    #[arg(long)]
    kappa: Option<f64>,
    #[arg(long)]
    theta: Option<f64>,
    #[arg(long)]
    xi: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    rho: Option<f64>,
    /// Time to expiry in years
    #[arg(long)]
    t: Option<f64>,
    #[arg(long)]
    strike: Option<f64>,
    /// Time steps per path
    #[arg(long)]
    steps: Option<usize>,

    #[arg(long)]
    tracking_limit: Option<usize>,
    #[arg(long)]
    path_capacity: Option<usize>,
    /// Fixed seed; the wall clock is used when absent
    #[arg(long)]
    seed: Option<u64>,
    /// Price a put instead of a call
    #[arg(long)]
    put: bool,

    #[arg(long, default_value_t = 20)]
    batches: usize,
    #[arg(long, default_value_t = 500, allow_negative_numbers = true)]
    batch_size: i64,

    /// Directory for percentile_paths.csv and convergence.csv
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunFile {
    params: HestonParams,
    config: SimulationConfig,
}

impl Args {
    fn resolve(&self) -> Result<(HestonParams, SimulationConfig), Box<dyn Error>> {
        let file = match &self.config {
            Some(path) => serde_json::from_str::<RunFile>(&fs::read_to_string(path)?)?,
            None => RunFile::default(),
        };
        let mut params = file.params;
        let mut config = file.config;

        let flags = self;
        macro_rules! override_with {
            ($target:ident . $field:ident) => {
                if let Some(value) = flags.$field {
                    $target.$field = value;
                }
            };
        }
        override_with!(params.s0);
        override_with!(params.v0);
        override_with!(params.r);
        override_with!(params.kappa);
        override_with!(params.theta);
        override_with!(params.xi);
        override_with!(params.rho);
        override_with!(params.t);
        override_with!(params.strike);
        override_with!(params.steps);
        override_with!(config.tracking_limit);
        override_with!(config.path_capacity);

        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.put {
            config.option = OptionKind::Put;
        }
        Ok((params, config))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let (params, config) = args.resolve()?;
    let mut sim = SimulationRun::new(params, config)?;

    println!(
        "{:>10} {:>12} {:>10} {:>13} {:>9}",
        "sims", "price", "std_err", "black-scholes", "phase"
    );

    let mut history: Vec<RunSummary> = Vec::with_capacity(args.batches);
    let mut timer = Timer::new();
    timer.start();
    for _ in 0..args.batches {
        sim.run_batch(args.batch_size);
        let row = sim.summary();
        println!(
            "{:>10} {:>12.6} {:>10.6} {:>13.6} {:>9}",
            row.simulations, row.price, row.std_error, row.black_scholes, row.phase
        );
        history.push(row);
    }
    let elapsed_ms = timer.elapsed_ms();

    info!(
        simulations = sim.simulation_count(),
        elapsed_ms,
        paths_per_sec = sim.simulation_count() as f64 / (elapsed_ms / 1000.0).max(1e-9),
        "run finished"
    );

    match sim.percentile_paths() {
        Some(paths) => {
            println!("\nterminal prices of percentile paths:");
            for p in Percentile::ALL {
                if let Some(terminal) = sim.percentile_terminal(p) {
                    println!("  {:>4}: {:.6}", p, terminal);
                }
            }
            if let Some(dir) = &args.out_dir {
                fs::create_dir_all(dir)?;
                output::write_percentile_paths_csv(
                    dir.join("percentile_paths.csv"),
                    sim.params().dt(),
                    &paths,
                )?;
            }
        }
        None => println!("\npercentile paths not available (still tracking or none stored)"),
    }

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)?;
        output::write_convergence_csv(dir.join("convergence.csv"), &history)?;
        println!("results written to {}", dir.display());
    }

    Ok(())
}
