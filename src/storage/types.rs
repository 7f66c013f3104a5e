//! Core data types for the notepulse snapshot store
//!
//! This module defines the types shared across the whole pipeline:
//! - `NoteMetric`: one note's counters at observation time
//! - `NoteKey`: the identity used to match a note across days
//! - `DailySnapshot`: one calendar day's full observation
//!
//! The serialized field names (`like`, `collect`, `comment`, `time`) are
//! the legacy wire format of the archived JSON files and the manual input
//! file, so existing archives stay readable.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Display/wire format for snapshot timestamps (`"2026-08-25 09:30"`).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One note's engagement counters at a point in time.
///
/// Counters are non-negative by construction; day-over-day deltas may
/// still be negative (corrected or removed content), which the analyzer
/// handles without clamping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteMetric {
    /// Note title; also the cross-day identity (see [`NoteKey`])
    pub title: String,
    /// Like count
    #[serde(rename = "like")]
    pub likes: u64,
    /// Collect (bookmark) count
    #[serde(rename = "collect")]
    pub collects: u64,
    /// Comment count
    #[serde(rename = "comment")]
    pub comments: u64,
}

impl NoteMetric {
    /// Create a new note observation
    pub fn new(title: impl Into<String>, likes: u64, collects: u64, comments: u64) -> Self {
        Self {
            title: title.into(),
            likes,
            collects,
            comments,
        }
    }

    /// Identity key used for all cross-day matching
    pub fn key(&self) -> NoteKey<'_> {
        NoteKey::of(self)
    }
}

/// Identity of a note across snapshots.
///
/// Matching is by exact title string, which is fragile (renames,
/// whitespace edits, duplicated titles silently break continuity). Every
/// cross-day lookup goes through this type so a stronger key can replace
/// title matching without touching the analyzer. Duplicate titles within
/// one snapshot are undefined behavior; lookups return the first match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteKey<'a>(&'a str);

impl<'a> NoteKey<'a> {
    /// Key for a note observation
    pub fn of(note: &'a NoteMetric) -> Self {
        Self(note.title.as_str())
    }

    /// Key from a raw title
    pub fn from_title(title: &'a str) -> Self {
        Self(title)
    }

    /// Whether `other` is the same note under the current matching rule
    pub fn matches(&self, other: &NoteMetric) -> bool {
        self.0 == other.title
    }
}

/// One calendar day's full observation of all tracked notes.
///
/// Created once per run from the manual input file and persisted keyed
/// by calendar date; re-saving the same date overwrites the prior file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySnapshot {
    /// When the snapshot was generated (local time, minute precision on
    /// the wire)
    #[serde(rename = "time", with = "display_time")]
    pub timestamp: NaiveDateTime,
    /// Observed notes, in input order
    pub notes: Vec<NoteMetric>,
}

impl DailySnapshot {
    /// Create a snapshot stamped with the current local time
    pub fn new(notes: Vec<NoteMetric>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            notes,
        }
    }

    /// Create a snapshot with an explicit timestamp (backfills, tests)
    pub fn with_timestamp(notes: Vec<NoteMetric>, timestamp: NaiveDateTime) -> Self {
        Self { timestamp, notes }
    }

    /// Calendar date this snapshot is keyed by
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// First note matching `key`, if any
    pub fn find(&self, key: NoteKey<'_>) -> Option<&NoteMetric> {
        self.notes.iter().find(|n| key.matches(n))
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }
}

/// Serde adapter for the wire-format timestamp string.
mod display_time {
    use super::{NaiveDateTime, TIME_FORMAT};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
