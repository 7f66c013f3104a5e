//! Daily metrics analyzer
//!
//! Compares today's snapshot against the trailing history window and
//! produces one [`NoteAnalysis`] per note: day-over-day deltas, trailing
//! moving averages, an anomaly flag, and a top-K rank by like delta.
//! Pure function of its inputs; no I/O, no rendering.

use crate::storage::history::HistoryWindow;
use crate::storage::types::{DailySnapshot, NoteKey, NoteMetric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Window the anomaly rule is evaluated on, regardless of which windows
/// are configured for reporting
pub const ANOMALY_WINDOW_DAYS: u32 = 7;

/// How a stored day that lacks a matching title contributes to a
/// moving-average window.
///
/// This only concerns days that have a snapshot; calendar days with no
/// snapshot at all are never part of the window under either policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTitlePolicy {
    /// Average only the values actually found (default)
    #[default]
    Skip,
    /// The day contributes a zero to the mean
    CountAsZero,
}

/// Analyzer tuning knobs
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Moving-average window sizes to report, in days
    pub windows: Vec<u32>,
    /// Spike threshold: anomalous when likes > 7-day average * factor
    pub anomaly_factor: f64,
    /// How many notes get a rank by like delta
    pub top_k: usize,
    /// Contribution of stored days without the title (see enum docs)
    pub missing_title: MissingTitlePolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            windows: vec![7, 14],
            anomaly_factor: 1.5,
            top_k: 3,
            missing_title: MissingTitlePolicy::default(),
        }
    }
}

/// Per-note analysis for one run
#[derive(Debug, Clone, Serialize)]
pub struct NoteAnalysis {
    /// Today's observation of the note
    pub note: NoteMetric,
    /// Like delta vs. the most recent prior snapshot (raw count when the
    /// note has no prior observation there)
    pub delta_likes: i64,
    /// Collect delta, same baseline rule
    pub delta_collects: i64,
    /// Comment delta, same baseline rule
    pub delta_comments: i64,
    /// Trailing like averages, one entry per configured window size
    pub moving_averages: BTreeMap<u32, f64>,
    /// Whether today's likes exceed the 7-day average by the configured
    /// factor
    pub is_anomalous: bool,
    /// 1-based position in today's top-K by like delta, when within K
    pub rank: Option<u32>,
}

impl NoteAnalysis {
    /// Rank 1: the day's strongest like delta
    pub fn is_top_of_day(&self) -> bool {
        self.rank == Some(1)
    }
}

/// Analyze today's snapshot against the trailing history window.
///
/// Results are in input order, one per note in `today`. The window must
/// not contain today itself; [`HistoryWindow::trailing`] guards against
/// it regardless.
pub fn analyze(
    today: &DailySnapshot,
    history: &HistoryWindow,
    config: &AnalyzerConfig,
) -> Vec<NoteAnalysis> {
    let today_date = today.date();
    let baseline = history.latest();

    let mut results: Vec<NoteAnalysis> = today
        .notes
        .iter()
        .map(|note| {
            let key = note.key();

            // Baseline is the single most recent prior snapshot, not a
            // search across all history; absent there means zero.
            let prior = baseline.and_then(|s| s.find(key));
            let (base_likes, base_collects, base_comments) = match prior {
                Some(p) => (p.likes, p.collects, p.comments),
                None => (0, 0, 0),
            };

            let mut moving_averages = BTreeMap::new();
            for &window in &config.windows {
                moving_averages.insert(
                    window,
                    trailing_like_average(history, today_date, key, window, config.missing_title),
                );
            }

            // The anomaly rule always runs on the 7-day window, even
            // when 7 is not among the reported windows.
            let week_average = moving_averages
                .get(&ANOMALY_WINDOW_DAYS)
                .copied()
                .unwrap_or_else(|| {
                    trailing_like_average(
                        history,
                        today_date,
                        key,
                        ANOMALY_WINDOW_DAYS,
                        config.missing_title,
                    )
                });
            let is_anomalous = note.likes as f64 > week_average * config.anomaly_factor;

            NoteAnalysis {
                delta_likes: note.likes as i64 - base_likes as i64,
                delta_collects: note.collects as i64 - base_collects as i64,
                delta_comments: note.comments as i64 - base_comments as i64,
                moving_averages,
                is_anomalous,
                rank: None,
                note: note.clone(),
            }
        })
        .collect();

    assign_ranks(&mut results, config.top_k);
    results
}

/// Trailing like average for one title over the `window` calendar days
/// before `today`.
///
/// Today is excluded. An empty contributing set averages to exactly 0.0.
pub fn trailing_like_average(
    history: &HistoryWindow,
    today: NaiveDate,
    key: NoteKey<'_>,
    window: u32,
    policy: MissingTitlePolicy,
) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u32;

    for snapshot in history.trailing(today, window) {
        match snapshot.find(key) {
            Some(note) => {
                sum += note.likes as f64;
                count += 1;
            }
            None => {
                if policy == MissingTitlePolicy::CountAsZero {
                    count += 1;
                }
            }
        }
    }

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Tag the top `top_k` notes by like delta with ranks 1..=K.
///
/// Stable: ties keep input order. Ranking applies regardless of delta
/// sign, so a day where everything declined still has a top note.
fn assign_ranks(results: &mut [NoteAnalysis], top_k: usize) {
    let mut order: Vec<usize> = (0..results.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(results[i].delta_likes));

    for (position, &index) in order.iter().take(top_k).enumerate() {
        results[index].rank = Some(position as u32 + 1);
    }
}
