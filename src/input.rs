//! Manual input snapshot loading
//!
//! The day's observations arrive as a hand-maintained JSON file: an
//! array of `{title, like, collect, comment}` objects. An absent file is
//! not an error; the run substitutes one synthetic placeholder note so
//! the rest of the pipeline always has an entry to process. A file that
//! exists but cannot be read or parsed fails the run.

use crate::storage::types::NoteMetric;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Title of the synthetic note used when no input file exists
pub const PLACEHOLDER_TITLE: &str = "Sample note 1";

/// Errors reading the manual input file
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read input file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse input file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// The synthetic note substituted when the input file is missing
pub fn placeholder_note() -> NoteMetric {
    NoteMetric::new(PLACEHOLDER_TITLE, 100, 30, 10)
}

/// Read today's notes from the manual input file.
///
/// Missing file → a single placeholder note (logged, not an error).
/// Unreadable or malformed file → [`InputError`].
pub fn read_notes(path: &Path) -> Result<Vec<NoteMetric>, InputError> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "input file not found, substituting placeholder note"
        );
        return Ok(vec![placeholder_note()]);
    }

    let content = std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let notes: Vec<NoteMetric> = serde_json::from_str(&content).map_err(|e| InputError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    tracing::info!(path = %path.display(), notes = notes.len(), "read input snapshot");
    Ok(notes)
}
