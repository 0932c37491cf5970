//! Writes a sample gradation table for every built-in material in CSV, JSON
//! and Parquet form.
//!
//! Usage: `generate_sample [OUTPUT_DIR] [TOTAL_WEIGHT]` (defaults: `samples`, 2000).

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gradation::data::export::{write_csv, write_json, write_parquet};
use gradation::engine::{
    parse_total_weight, FmCalculator, GradationEngine, MaterialKind, RandomCurveGenerator,
    TotalWeightManager,
};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "samples".to_string()));
    let total_weight = match args.next() {
        Some(w) => parse_total_weight(&w).context("TOTAL_WEIGHT must be a positive number")?,
        None => 2000.0,
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(42);
    let generator = RandomCurveGenerator::new();
    let engine = GradationEngine::new(TotalWeightManager::new(total_weight));

    for kind in MaterialKind::ALL {
        let spec = kind.spec();
        let passing = generator.generate_with(&mut rng, spec.lower_limits(), spec.upper_limits())?;
        let retained = engine.passing_to_retained(&passing);

        for ext in ["csv", "json", "parquet"] {
            let path = out_dir.join(format!("{}.{ext}", kind.key()));
            match ext {
                "csv" => write_csv(&path, &spec, &passing, &retained, total_weight),
                "json" => write_json(&path, &spec, &passing, &retained, total_weight),
                _ => write_parquet(&path, &spec, &passing, &retained, total_weight),
            }
            .with_context(|| format!("writing {}", path.display()))?;
        }

        println!(
            "{:<18} {} sieves, FM {:.3}",
            kind.display_name(),
            spec.len(),
            FmCalculator.fm_from_passing(&passing)
        );
    }

    println!("Wrote sample tables to {}", out_dir.display());
    Ok(())
}
