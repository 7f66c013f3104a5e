//! Snapshot storage
//!
//! File-backed persistence for daily note-metric snapshots:
//!
//! - **types**: Core data structures (NoteMetric, NoteKey, DailySnapshot)
//! - **store**: One JSON file per calendar day, overwrite-idempotent
//! - **history**: Trailing window of prior snapshots for the analyzer
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! data/
//!   2026-08-23.json
//!   2026-08-24.json
//!   2026-08-25.json
//! ```
//!
//! Each file is a full-document write; a date saved twice keeps a single
//! file with the latest content.

pub mod error;
pub mod history;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use history::HistoryWindow;
pub use store::SnapshotStore;
pub use types::{DailySnapshot, NoteKey, NoteMetric, TIME_FORMAT};
