//! Notepulse CLI
//!
//! Command-line interface for the daily note report:
//! - Run the pipeline (archive, analyze, push)
//! - Generate a default config file

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use notepulse::config::{generate_default_config, Config, ConfigSource};
use notepulse::pipeline::{run_daily_report, RunError, RunOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser)]
#[command(name = "notepulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily note-performance reporter")]
#[command(
    long_about = "Notepulse archives a daily snapshot of note metrics, compares it\n\
        against trailing history, and pushes a markdown digest with a trend chart."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run today's report (the default when no subcommand is given)
    Run {
        /// Input snapshot file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Snapshot archive directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Report date override, YYYY-MM-DD (backfills)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Archive and render but do not push
        #[arg(long)]
        skip_push: bool,

        /// Skip chart rendering for this run
        #[arg(long)]
        no_chart: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Some(Commands::Config { output }) = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content).with_context(|| {
                    format!("Failed to write config template to {}", path.display())
                })?;
                println!("Wrote config template to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let (mut config, config_source) = match &cli.config {
        Some(path) => {
            let config = Config::load_with_env(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            let source = ConfigSource {
                path: Some(path.clone()),
                skipped: Vec::new(),
            };
            (config, source)
        }
        None => Config::load_default(),
    };

    // Command-line flags win over file and environment settings
    let mut options = RunOptions::default();
    if let Some(Commands::Run {
        input,
        data_dir,
        date,
        skip_push,
        no_chart,
    }) = cli.command
    {
        if let Some(input) = input {
            config.input.path = input.to_string_lossy().to_string();
        }
        if let Some(data_dir) = data_dir {
            config.storage.data_dir = data_dir.to_string_lossy().to_string();
        }
        options = RunOptions {
            date,
            skip_push,
            no_chart,
        };
    }

    init_logging(&config);

    tracing::info!("Notepulse v{}", env!("CARGO_PKG_VERSION"));

    // Config was resolved before the subscriber existed; report it now
    for (path, e) in &config_source.skipped {
        tracing::warn!("Failed to load config from {:?}: {}", path, e);
    }
    match &config_source.path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    tracing::info!("Data directory: {:?}", config.storage.data_dir);

    match run_daily_report(&config, options).await {
        Ok(summary) => {
            tracing::info!(
                "Report for {} done in {}ms",
                summary.date,
                summary.duration_ms
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Ok(match e {
                RunError::Input(_) => ExitCode::from(1),
                RunError::Delivery(_) => ExitCode::from(2),
                RunError::Storage(_) => ExitCode::FAILURE,
            })
        }
    }
}

/// Initialize tracing from the logging config.
///
/// `RUST_LOG` still wins over the configured level when set.
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| format!("notepulse={}", config.logging.level)),
    );

    let file_writer = config.logging.file.as_ref().and_then(|path| {
        match std::fs::File::create(path) {
            Ok(file) => Some(Arc::new(file)),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path, e);
                None
            }
        }
    });

    let fmt_layer = match (config.logging.format.as_str(), file_writer) {
        ("json", Some(writer)) => tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
        ("json", None) => tracing_subscriber::fmt::layer().json().boxed(),
        (_, Some(writer)) => tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
        (_, None) => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
