//! Metrics analysis
//!
//! Day-over-day deltas, trailing moving averages, anomaly detection, and
//! replication idea generation. Everything here is pure computation over
//! already-loaded snapshots.

pub mod analyzer;
pub mod ideas;

pub use analyzer::{
    analyze, AnalyzerConfig, MissingTitlePolicy, NoteAnalysis, ANOMALY_WINDOW_DAYS,
};
pub use ideas::{generate_ideas, NoteIdeas};
