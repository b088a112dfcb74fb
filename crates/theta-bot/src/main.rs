//! ThetaGang decision engine - Entry Point
//!
//! Runs one decision cycle over a market snapshot and prints the report.
//! No orders are placed.

use anyhow::{Context, Result};
use clap::Parser;
use theta_bot::{AppConfig, DecisionEngine, MarketSnapshot};
use tracing::info;

/// Options-selling strategy decision and risk validation engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via THETA_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Market snapshot JSON file
    #[arg(short, long)]
    snapshot: String,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = AppConfig::resolve_path(args.config.as_deref());
    let config = AppConfig::from_file(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    theta_telemetry::init_logging(&config.logging.level)?;

    info!("Starting ThetaGang v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = %config_path,
        symbols = config.symbols.tickers.len(),
        dry_run = config.dry_run,
        "Configuration loaded"
    );

    let snapshot = MarketSnapshot::from_file(&args.snapshot)
        .with_context(|| format!("loading snapshot from {}", args.snapshot))?;

    let engine = DecisionEngine::new(&config);
    let report = engine.run_cycle(&snapshot);

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");

    Ok(())
}
