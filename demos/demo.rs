// demos/demo.rs
use heston_mc::math_utils::Timer;
use heston_mc::mc::mc_engine::{SimulationConfig, SimulationRun};
use heston_mc::mc::payoffs::OptionKind;
use heston_mc::mc::percentiles::Percentile;
use heston_mc::models::heston::HestonParams;
use heston_mc::output;
use heston_mc::SdeResult;

fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();

    if let Err(e) = run_demo_mode() {
        eprintln!("demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run_demo_mode() -> SdeResult<()> {
    println!("Running heston-mc Monte Carlo Demo\n");

    let params = HestonParams::default();
    let config = SimulationConfig {
        seed: Some(42),
        ..SimulationConfig::default()
    };

    println!("--- Heston European call ---");
    println!(
        "S0 = {}, K = {}, r = {}, T = {}, v0 = {}, kappa = {}, theta = {}, xi = {}, rho = {}",
        params.s0, params.strike, params.r, params.t, params.v0, params.kappa, params.theta,
        params.xi, params.rho
    );

    let mut call = SimulationRun::new(params, config.clone())?;
    let mut timer = Timer::new();
    timer.start();
    for _ in 0..10 {
        call.run_batch(2_000);
        println!(
            "  {:>6} sims  price {:>9.4}  ± {:.4}  ({})",
            call.simulation_count(),
            call.option_price(),
            call.standard_error(),
            call.phase()
        );
    }
    println!("  Black-Scholes at sqrt(v0): {:.4}", call.black_scholes_price());
    println!("  Elapsed: {:.2} ms", timer.elapsed_ms());

    println!("\n--- Percentile paths (terminal prices) ---");
    for p in Percentile::ALL {
        if let Some(terminal) = call.percentile_terminal(p) {
            println!("  {:>4}: {:.4}", p, terminal);
        }
    }

    println!("\n--- Heston European put (same seed) ---");
    let mut put = SimulationRun::new(
        params,
        SimulationConfig {
            option: OptionKind::Put,
            ..config
        },
    )?;
    put.run_batch(20_000);
    println!(
        "  MC put: {:.4} ± {:.4}, Black-Scholes put: {:.4}",
        put.option_price(),
        put.standard_error(),
        put.black_scholes_price()
    );

    // Same draws for both runs, so parity holds path by path up to discretization.
    let parity = call.option_price() - put.option_price();
    let forward = params.s0 - params.strike * params.discount_factor();
    println!("  C - P = {:.4}, S0 - K e^(-rT) = {:.4}", parity, forward);

    if let Some(paths) = call.percentile_paths() {
        let out = std::env::temp_dir().join("heston_demo_percentiles.csv");
        output::write_percentile_paths_csv(&out, params.dt(), &paths)?;
        println!("\nPercentile paths written to {}", out.display());
    }

    Ok(())
}
