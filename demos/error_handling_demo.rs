// demos/error_handling_demo.rs
use heston_mc::error::SdeError;
use heston_mc::mc::mc_engine::{SimulationConfig, SimulationRun, MAX_TRACKED_PATHS};
use heston_mc::models::heston::{Heston, HestonParams};

fn main() {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    println!("Error Handling Demo for heston-mc");
    println!("=================================\n");

    // Test 1: Invalid Heston parameters
    println!("1. Testing invalid Heston parameters...");
    let invalid_params = HestonParams {
        s0: -100.0,
        ..HestonParams::default()
    };
    match Heston::new(invalid_params) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: Invalid correlation
    println!("\n2. Testing invalid correlation...");
    let invalid_rho_params = HestonParams {
        rho: 1.5,
        ..HestonParams::default()
    };
    match SimulationRun::new(invalid_rho_params, SimulationConfig::default()) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 3: Feller violation warns but does not fail
    println!("\n3. Testing extreme but valid parameters...");
    let extreme_params = HestonParams {
        kappa: 1.0,
        xi: 0.8,
        ..HestonParams::default()
    };
    match Heston::new(extreme_params) {
        Ok(_) => println!("   ✓ Created with warning (Feller condition violated)"),
        Err(e) => println!("   Error: {}", e),
    }

    // Test 4: Oversized tracking configuration
    println!("\n4. Testing invalid driver configuration...");
    let invalid_config = SimulationConfig {
        path_capacity: MAX_TRACKED_PATHS + 1,
        ..SimulationConfig::default()
    };
    match SimulationRun::new(HestonParams::default(), invalid_config) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 5: A failed re-initialization keeps the previous run
    println!("\n5. Testing re-initialization with bad parameters...");
    let config = SimulationConfig {
        seed: Some(7),
        ..SimulationConfig::default()
    };
    match SimulationRun::new(HestonParams::default(), config) {
        Ok(mut run) => {
            run.run_batch(500);
            let before = run.simulation_count();
            let bad = HestonParams {
                steps: 0,
                ..HestonParams::default()
            };
            match run.initialize(bad) {
                Ok(()) => println!("   Unexpected: Should have failed!"),
                Err(e) => println!(
                    "   ✓ Caught error: {} (simulations kept: {} -> {})",
                    e,
                    before,
                    run.simulation_count()
                ),
            }
        }
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Test 6: Error type matching
    println!("\n6. Testing error type matching...");
    let bad_params = HestonParams {
        v0: -0.04,
        ..HestonParams::default()
    };
    match Heston::new(bad_params) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(SdeError::InvalidParameters {
            parameter,
            value,
            constraint,
        }) => {
            println!(
                "   ✓ Caught InvalidParameters: {} = {} ({})",
                parameter, value, constraint
            );
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    println!("\n✓ Error handling demo complete!");
}
