//! Portfolio Risk Analyzer CLI
//!
//! Runs the risk pipeline for the configured portfolio and prints the
//! narrated report.

use anyhow::Result;
use clap::Parser;
use risk_analyzer::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Portfolio Risk Analyzer - VaR, stress test, volatility and a narrated rating
#[derive(Parser, Debug)]
#[command(name = "risk-analyzer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Calendar days of history for VaR and volatility
    #[arg(short, long)]
    lookback_days: Option<u32>,

    /// Price source (synthetic, csv)
    #[arg(short, long)]
    source: Option<SourceKind>,

    /// Directory of <ASSET>.csv files for the csv source
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Seed for the synthetic source
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        CliOverrides {
            config_file: args.config,
            lookback_days: args.lookback_days,
            source: args.source,
            data_dir: args.data_dir,
            seed: args.seed,
            log_level: args.log_level,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args.into())?;

    init_tracing(&config.log_level.to_lowercase());

    println!("{}", banner("PORTFOLIO RISK ANALYZER - Starting..."));

    let progress: ProgressCallback = Arc::new(|node: NodeId, status: NodeStatus| {
        tracing::debug!(node = %node, status = ?status, "Pipeline progress");
    });
    let pipeline = RiskPipeline::new(
        price_source(&config),
        text_generator(&config)?,
        PipelineSettings::from(&config),
    )
    .with_progress(progress);

    let outcome = pipeline
        .run(config.portfolio(), config.lookback_days)
        .await?;

    println!("\n{}", banner("RISK METRICS"));
    println!("{}", metrics_summary(&outcome.risk_report));

    println!("\n{}", banner("FINAL RISK REPORT"));
    println!("{}", outcome.final_report.text);
    println!("\nRating: {}", outcome.final_report.rating);

    tracing::info!(elapsed_ms = outcome.elapsed.as_millis() as u64, "Done");
    Ok(())
}
