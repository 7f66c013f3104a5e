//! Trailing history window
//!
//! Wraps the ordered snapshot sequence returned by
//! [`SnapshotStore::load_range`](crate::storage::SnapshotStore::load_range):
//! oldest first, one snapshot per stored day, missing days simply absent.
//! Today's snapshot is never part of the window; the analyzer compares
//! against it and the chart overlays it separately.

use crate::storage::types::DailySnapshot;
use chrono::{Days, NaiveDate};

/// Ordered window of prior daily snapshots, oldest first
#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    snapshots: Vec<DailySnapshot>,
}

impl HistoryWindow {
    /// Wrap an oldest-first snapshot sequence
    pub fn new(snapshots: Vec<DailySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Window with no history (cold start)
    pub fn empty() -> Self {
        Self::default()
    }

    /// All snapshots in the window, oldest first
    pub fn snapshots(&self) -> &[DailySnapshot] {
        &self.snapshots
    }

    /// The most recent prior snapshot; the baseline day for deltas
    pub fn latest(&self) -> Option<&DailySnapshot> {
        self.snapshots.last()
    }

    /// Date of the oldest snapshot in the window
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.snapshots.first().map(|s| s.date())
    }

    /// Snapshots dated within the trailing `days` calendar days before
    /// `today`, oldest first.
    ///
    /// A calendar day with no stored snapshot is simply absent here; it
    /// never contributes to whatever is computed over the window. Any
    /// snapshot dated `today` or later is excluded as well, so a window
    /// accidentally built with today included stays historical.
    pub fn trailing(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> impl Iterator<Item = &DailySnapshot> + '_ {
        let cutoff = today.checked_sub_days(Days::new(days as u64));
        self.snapshots.iter().filter(move |s| {
            let d = s.date();
            d < today && cutoff.map(|c| d >= c).unwrap_or(true)
        })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
