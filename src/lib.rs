//! # Notepulse
//!
//! Daily note-performance reporter - archives note metric snapshots,
//! detects engagement spikes against trailing history, and pushes a
//! markdown digest with a trend chart.
//!
//! ## Features
//!
//! - **Daily archive**: one JSON snapshot file per calendar day, written
//!   atomically
//! - **Day-over-day analysis**: signed deltas, trailing moving averages,
//!   spike detection, top-K ranking
//! - **Replication ideas**: follow-up suggestions for spiking notes
//! - **Trend chart**: multi-series engagement chart rendered with
//!   Plotters
//! - **Push delivery**: ServerChan-compatible markdown push
//!
//! ## Modules
//!
//! - [`storage`]: snapshot archive and history loading
//! - [`analysis`]: deltas, moving averages, anomalies, ideas
//! - [`report`]: markdown digest and trend chart
//! - [`notify`]: push delivery
//! - [`pipeline`]: one-invocation orchestration of a daily run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notepulse::config::Config;
//! use notepulse::pipeline::{run_daily_report, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (config, _source) = Config::load_default();
//!     let summary = run_daily_report(&config, RunOptions::default()).await?;
//!
//!     println!(
//!         "Archived {} notes for {}, {} spiking",
//!         summary.notes, summary.date, summary.anomalies
//!     );
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod input;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    DailySnapshot, HistoryWindow, NoteKey, NoteMetric, SnapshotStore, StorageError, StorageResult,
};

pub use analysis::{
    analyze, generate_ideas, AnalyzerConfig, MissingTitlePolicy, NoteAnalysis, NoteIdeas,
    ANOMALY_WINDOW_DAYS,
};

pub use report::{render_digest, render_trend_chart, ChartError, PUSH_TITLE};

pub use notify::{NotifyError, PushClient, PushConfig};

pub use pipeline::{run_daily_report, RunError, RunOptions, RunSummary};

pub use config::{Config, ConfigError, ConfigSource, LoggingConfig};

pub use input::{read_notes, InputError, PLACEHOLDER_TITLE};
