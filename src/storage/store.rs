//! Daily snapshot persistence
//!
//! One JSON document per calendar day, named `YYYY-MM-DD.json` under the
//! data directory. Saving a snapshot for a date that already has a file
//! overwrites it, so re-running a day is idempotent. Writes go to a temp
//! sibling first and are renamed into place, so a crashed run never
//! leaves a partially written document behind.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::DailySnapshot;
use chrono::{Days, NaiveDate};
use std::path::{Path, PathBuf};

/// File-backed store for daily snapshots
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `data_dir` (created lazily on first save)
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root directory holding the per-day files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the snapshot file for a calendar date
    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    /// Save a snapshot, keyed by its own timestamp's calendar date.
    ///
    /// Returns the path written. The document is written in full to a
    /// temp sibling and renamed over any existing file for that date.
    pub fn save(&self, snapshot: &DailySnapshot) -> StorageResult<PathBuf> {
        std::fs::create_dir_all(&self.data_dir)?;

        let path = self.snapshot_path(snapshot.date());
        let content = serde_json::to_string_pretty(snapshot)?;

        // Temp filename includes PID to avoid cross-process collisions
        let tmp = path.with_extension(format!("json.tmp.{}", std::process::id()));
        std::fs::write(&tmp, content.as_bytes())?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!(
            path = %path.display(),
            notes = snapshot.len(),
            "saved daily snapshot"
        );

        Ok(path)
    }

    /// Load the snapshot for a single date, if one is stored.
    ///
    /// A missing file is `None`; a file that exists but cannot be parsed
    /// is a [`StorageError::Corrupt`].
    pub fn load_day(&self, date: NaiveDate) -> StorageResult<Option<DailySnapshot>> {
        let path = self.snapshot_path(date);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let snapshot = serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: path.clone(),
            error: e.to_string(),
        })?;

        Ok(Some(snapshot))
    }

    /// Load the snapshots stored for the `days` calendar dates strictly
    /// before `end_date_exclusive`, oldest first.
    ///
    /// Dates with no stored file are skipped, so the result can be
    /// shorter than `days`; zero stored snapshots returns an empty vec.
    pub fn load_range(
        &self,
        end_date_exclusive: NaiveDate,
        days: u32,
    ) -> StorageResult<Vec<DailySnapshot>> {
        let mut snapshots = Vec::new();

        for back in (1..=days as u64).rev() {
            let date = match end_date_exclusive.checked_sub_days(Days::new(back)) {
                Some(d) => d,
                None => continue,
            };

            if let Some(snapshot) = self.load_day(date)? {
                snapshots.push(snapshot);
            }
        }

        tracing::debug!(
            end = %end_date_exclusive,
            days,
            found = snapshots.len(),
            "loaded snapshot range"
        );

        Ok(snapshots)
    }
}
