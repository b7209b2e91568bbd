//! Convert a legacy Korean-keyed catalog export into canonical catalog JSON
//!
//! Usage: convert_legacy <input.json> <output.json>

use anyhow::{Context, Result};
use clap::Parser;
use handset_pricing::catalog::legacy::LegacyCatalog;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convert_legacy")]
#[command(about = "Convert a legacy catalog export to canonical JSON", long_about = None)]
struct Args {
    /// Legacy catalog JSON
    input: PathBuf,

    /// Where to write the canonical catalog
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let legacy = LegacyCatalog::from_path(&args.input)
        .with_context(|| format!("Failed to read legacy catalog {}", args.input.display()))?;
    let catalog = legacy
        .into_catalog()
        .context("Legacy catalog failed validation")?;

    let json = catalog.to_json_pretty()?;
    fs::write(&args.output, json)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Converted {} devices, {} plans, {} subsidy entries -> {}",
        catalog.devices().len(),
        catalog.plans().len(),
        catalog.subsidies().len(),
        args.output.display()
    );
    Ok(())
}
