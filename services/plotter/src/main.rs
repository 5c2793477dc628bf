//! Surface station plotter.
//!
//! Fetches METAR and SYNOP observations, thins them to a readable density,
//! analyses sea level pressure for isobars and writes one station model map
//! per configured region.

mod config;
mod pipeline;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::PlotterConfig;
use pipeline::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "plotter")]
#[command(about = "Station model maps from METAR and SYNOP observations")]
struct Args {
    /// YAML configuration (built-in region presets when omitted)
    #[arg(short, long, env = "PLOTTER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory the maps are written to
    #[arg(short, long, env = "PLOTTER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Only plot these regions (repeatable, e.g. --region EU --region AT)
    #[arg(short, long)]
    region: Vec<String>,

    /// Observation hour as YYYY/MM/DD/HH (default: the current hour)
    #[arg(short, long, value_parser = pipeline::parse_time)]
    time: Option<chrono::DateTime<chrono::Utc>>,

    /// Read SYNOP reports from a local CSV file instead of downloading
    #[arg(long)]
    synop_file: Option<PathBuf>,

    /// Maximum fetch attempts per source
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let mut config = match &args.config {
        Some(path) => config::load(path)?,
        None => PlotterConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(max_attempts) = args.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
    config.select_regions(&args.region)?;
    config.validate()?;

    info!(
        regions = config.regions.len(),
        output_dir = %config.resolved_output_dir().display(),
        time = ?args.time,
        "Starting station plotter"
    );

    let options = RunOptions {
        time: args.time,
        synop_file: args.synop_file.clone(),
    };

    // Network I/O and retry pauses are the only async work
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let written = runtime.block_on(pipeline::run(&config, &options))?;
    for path in &written {
        info!(path = %path.display(), "Map written");
    }

    Ok(())
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    match args.log_format {
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).init(),
    }
}
