// src/output.rs
use crate::error::{SdeError, SdeResult};
use crate::mc::mc_engine::RunSummary;
use crate::mc::percentiles::Percentile;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One row per time step, one column per percentile path.
///
/// Paths shorter than the longest one leave their trailing cells empty.
pub fn write_percentile_paths_csv<P: AsRef<Path>>(
    filename: P,
    dt: f64,
    paths: &[(Percentile, &[f64])],
) -> SdeResult<()> {
    let context = "writing percentile paths";
    let mut file = BufWriter::new(File::create(filename).map_err(|e| SdeError::io(context, e))?);

    let mut header = String::from("step,time");
    for (p, _) in paths {
        header.push(',');
        header.push_str(&p.to_string());
    }
    writeln!(file, "{}", header).map_err(|e| SdeError::io(context, e))?;

    let rows = paths.iter().map(|(_, path)| path.len()).max().unwrap_or(0);
    for step in 0..rows {
        let mut line = format!("{},{}", step, step as f64 * dt);
        for (_, path) in paths {
            line.push(',');
            if let Some(price) = path.get(step) {
                line.push_str(&price.to_string());
            }
        }
        writeln!(file, "{}", line).map_err(|e| SdeError::io(context, e))?;
    }
    file.flush().map_err(|e| SdeError::io(context, e))
}

/// Price estimate after each recorded batch.
pub fn write_convergence_csv<P: AsRef<Path>>(filename: P, history: &[RunSummary]) -> SdeResult<()> {
    let context = "writing convergence history";
    let mut file = BufWriter::new(File::create(filename).map_err(|e| SdeError::io(context, e))?);
    writeln!(file, "simulations,price,std_error,black_scholes")
        .map_err(|e| SdeError::io(context, e))?;
    for row in history {
        writeln!(
            file,
            "{},{},{},{}",
            row.simulations, row.price, row.std_error, row.black_scholes
        )
        .map_err(|e| SdeError::io(context, e))?;
    }
    file.flush().map_err(|e| SdeError::io(context, e))
}
