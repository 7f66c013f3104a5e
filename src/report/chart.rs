//! Trend chart rendering
//!
//! Draws the multi-series engagement chart attached to the digest: one
//! like series per note across the history window, collect/comment and
//! 7-day-average overlays for ranked notes, and today's anomaly and
//! top-of-day markers. Chart failures never block a report; the caller
//! downgrades them to a digest without an image.

use crate::analysis::analyzer::{trailing_like_average, MissingTitlePolicy, ANOMALY_WINDOW_DAYS};
use crate::analysis::NoteAnalysis;
use crate::storage::history::HistoryWindow;
use crate::storage::types::DailySnapshot;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output bitmap size in pixels
const CHART_SIZE: (u32, u32) = (1280, 720);

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Chart I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart rendering failed: {0}")]
    Render(String),
}

/// Render the trend chart for today's run into `out_dir`.
///
/// Returns the path of the written PNG, or `None` when there is nothing
/// to draw (no history to span a time axis).
pub fn render_trend_chart(
    out_dir: &Path,
    today: &DailySnapshot,
    history: &HistoryWindow,
    analyses: &[NoteAnalysis],
    policy: MissingTitlePolicy,
) -> Result<Option<PathBuf>, ChartError> {
    let today_date = today.date();
    let start_date = match history.earliest_date() {
        Some(date) => date,
        None => {
            debug!("No history to chart, skipping trend image");
            return Ok(None);
        }
    };
    if start_date >= today_date {
        return Ok(None);
    }

    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(format!("{}.png", today_date));

    let series = build_series(today, history, analyses, policy);
    let y_max = y_axis_max(&series);

    draw(&out_path, start_date..today_date, y_max, &series, today_date)
        .map_err(|e| ChartError::Render(e.to_string()))?;

    debug!(path = %out_path.display(), "Trend chart rendered");
    Ok(Some(out_path))
}

/// Plot data for one note, shared between series building and drawing
#[derive(Debug, Clone)]
pub(crate) struct TrendSeries {
    pub title: String,
    pub rank: Option<u32>,
    pub is_anomalous: bool,
    /// Like counts per observed day, today included, oldest first
    pub likes: Vec<(NaiveDate, f64)>,
    pub collects: Vec<(NaiveDate, f64)>,
    pub comments: Vec<(NaiveDate, f64)>,
    /// Trailing 7-day like average under the configured missing-title
    /// policy, only at days where the window contributes
    pub week_average: Vec<(NaiveDate, f64)>,
}

impl TrendSeries {
    /// Today's like point, the anchor for markers
    fn today_point(&self) -> Option<(NaiveDate, f64)> {
        self.likes.last().copied()
    }
}

/// Assemble per-note plot series from the snapshot and its history.
///
/// The week-average overlay uses the same `policy` as the analyzer, so
/// the plotted trend agrees with the averages the digest reports.
/// Relies on the window being sorted oldest first, as the store loads
/// it.
pub(crate) fn build_series(
    today: &DailySnapshot,
    history: &HistoryWindow,
    analyses: &[NoteAnalysis],
    policy: MissingTitlePolicy,
) -> Vec<TrendSeries> {
    let today_date = today.date();

    analyses
        .iter()
        .map(|analysis| {
            let key = analysis.note.key();

            let mut likes = Vec::new();
            let mut collects = Vec::new();
            let mut comments = Vec::new();
            for snapshot in history.snapshots() {
                if let Some(note) = snapshot.find(key) {
                    let date = snapshot.date();
                    likes.push((date, note.likes as f64));
                    collects.push((date, note.collects as f64));
                    comments.push((date, note.comments as f64));
                }
            }
            likes.push((today_date, analysis.note.likes as f64));
            collects.push((today_date, analysis.note.collects as f64));
            comments.push((today_date, analysis.note.comments as f64));

            let mut week_average = Vec::new();
            for date in history
                .snapshots()
                .iter()
                .map(|s| s.date())
                .chain(std::iter::once(today_date))
            {
                // Under CountAsZero every stored day in the window
                // contributes; under Skip only days with the title do
                let contributes = match policy {
                    MissingTitlePolicy::Skip => history
                        .trailing(date, ANOMALY_WINDOW_DAYS)
                        .any(|s| s.find(key).is_some()),
                    MissingTitlePolicy::CountAsZero => {
                        history.trailing(date, ANOMALY_WINDOW_DAYS).next().is_some()
                    }
                };
                if contributes {
                    week_average.push((
                        date,
                        trailing_like_average(history, date, key, ANOMALY_WINDOW_DAYS, policy),
                    ));
                }
            }

            TrendSeries {
                title: analysis.note.title.clone(),
                rank: analysis.rank,
                is_anomalous: analysis.is_anomalous,
                likes,
                collects,
                comments,
                week_average,
            }
        })
        .collect()
}

/// Palette color for the idx-th ranked series, as a plain `RGBAColor`
/// so one binding can feed the legend closure and the overlay styles
fn series_color(idx: usize) -> RGBAColor {
    Palette99::pick(idx).to_rgba()
}

/// Upper bound for the y axis, with headroom above the tallest point
pub(crate) fn y_axis_max(series: &[TrendSeries]) -> f64 {
    let peak = series
        .iter()
        .flat_map(|s| {
            s.likes
                .iter()
                .chain(&s.collects)
                .chain(&s.comments)
                .chain(&s.week_average)
        })
        .map(|&(_, v)| v)
        .fold(0.0f64, f64::max);

    (peak * 1.15).max(10.0)
}

fn draw(
    out_path: &Path,
    x_range: std::ops::Range<NaiveDate>,
    y_max: f64,
    series: &[TrendSeries],
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(out_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Note engagement through {}", today), ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0f64..y_max)?;
    chart.configure_mesh().x_desc("Day").y_desc("Count").draw()?;

    // Unranked notes first so the ranked lines draw on top of them
    for s in series.iter().filter(|s| s.rank.is_none()) {
        chart.draw_series(LineSeries::new(s.likes.clone(), &BLUE.mix(0.2)))?;
    }

    for (idx, s) in series.iter().filter(|s| s.rank.is_some()).enumerate() {
        let color = series_color(idx);
        let width = if s.rank == Some(1) { 3 } else { 2 };

        chart
            .draw_series(LineSeries::new(s.likes.clone(), color.stroke_width(width)))?
            .label(s.title.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        chart.draw_series(LineSeries::new(
            s.collects.clone(),
            color.mix(0.6).stroke_width(1),
        ))?;
        chart.draw_series(LineSeries::new(
            s.comments.clone(),
            color.mix(0.45).stroke_width(1),
        ))?;
        chart.draw_series(LineSeries::new(
            s.week_average.clone(),
            color.mix(0.35).stroke_width(1),
        ))?;
    }

    for s in series {
        if let Some(point) = s.today_point() {
            if s.is_anomalous {
                chart.draw_series(std::iter::once(Circle::new(point, 5, RED.filled())))?;
            }
            if s.rank == Some(1) {
                chart
                    .draw_series(std::iter::once(TriangleMarker::new(point, 7, BLACK.filled())))?;
            }
        }
    }

    if series.iter().any(|s| s.rank.is_some()) {
        chart.configure_series_labels().border_style(&BLACK).draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, AnalyzerConfig};
    use crate::storage::types::NoteMetric;
    use tempfile::tempdir;

    fn snapshot(date: &str, notes: &[(&str, u64)]) -> DailySnapshot {
        DailySnapshot::with_timestamp(
            notes
                .iter()
                .map(|&(title, likes)| NoteMetric::new(title, likes, likes / 3, likes / 10))
                .collect(),
            date.parse::<NaiveDate>()
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_no_chart_without_history() {
        let dir = tempdir().unwrap();
        let today = snapshot("2026-03-10", &[("A", 100)]);
        let analyses = analyze(&today, &HistoryWindow::empty(), &AnalyzerConfig::default());

        let result = render_trend_chart(
            dir.path(),
            &today,
            &HistoryWindow::empty(),
            &analyses,
            MissingTitlePolicy::Skip,
        )
        .unwrap();

        assert!(result.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_series_end_at_today() {
        let history = HistoryWindow::new(vec![
            snapshot("2026-03-08", &[("A", 50)]),
            snapshot("2026-03-09", &[("A", 80)]),
        ]);
        let today = snapshot("2026-03-10", &[("A", 100)]);
        let analyses = analyze(&today, &history, &AnalyzerConfig::default());

        let series = build_series(&today, &history, &analyses, MissingTitlePolicy::Skip);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].likes.len(), 3);
        assert_eq!(
            series[0].likes.last().copied().unwrap(),
            ("2026-03-10".parse().unwrap(), 100.0)
        );
    }

    #[test]
    fn test_series_skip_days_without_the_note() {
        let history = HistoryWindow::new(vec![
            snapshot("2026-03-08", &[("A", 50)]),
            snapshot("2026-03-09", &[("B", 10)]),
        ]);
        let today = snapshot("2026-03-10", &[("A", 100)]);
        let analyses = analyze(&today, &history, &AnalyzerConfig::default());

        let series = build_series(&today, &history, &analyses, MissingTitlePolicy::Skip);

        // 03-09 stored no "A": two points, not three
        assert_eq!(series[0].likes.len(), 2);
    }

    #[test]
    fn test_week_average_only_where_window_has_data() {
        let history = HistoryWindow::new(vec![
            snapshot("2026-03-08", &[("A", 100)]),
            snapshot("2026-03-09", &[("A", 110)]),
        ]);
        let today = snapshot("2026-03-10", &[("A", 320)]);
        let analyses = analyze(&today, &history, &AnalyzerConfig::default());

        let series = build_series(&today, &history, &analyses, MissingTitlePolicy::Skip);

        // 03-08 has an empty trailing window for "A", so the overlay
        // starts at 03-09
        let dates: Vec<NaiveDate> = series[0].week_average.iter().map(|&(d, _)| d).collect();
        assert_eq!(
            dates,
            vec![
                "2026-03-09".parse::<NaiveDate>().unwrap(),
                "2026-03-10".parse::<NaiveDate>().unwrap()
            ]
        );
        assert_eq!(series[0].week_average[1].1, 105.0);
    }

    #[test]
    fn test_overlay_follows_count_as_zero_policy() {
        // 03-09 stored a snapshot without "A"; under CountAsZero that
        // day drags the average down, and the overlay must plot the
        // same number the digest reports
        let history = HistoryWindow::new(vec![
            snapshot("2026-03-08", &[("A", 100)]),
            snapshot("2026-03-09", &[("B", 10)]),
        ]);
        let today = snapshot("2026-03-10", &[("A", 100)]);
        let config = AnalyzerConfig {
            missing_title: MissingTitlePolicy::CountAsZero,
            ..AnalyzerConfig::default()
        };
        let analyses = analyze(&today, &history, &config);
        assert_eq!(analyses[0].moving_averages[&7], 50.0);

        let series = build_series(&today, &history, &analyses, MissingTitlePolicy::CountAsZero);

        assert_eq!(
            series[0].week_average.last().copied().unwrap(),
            (today.date(), 50.0)
        );
    }

    #[test]
    fn test_y_axis_headroom_and_floor() {
        let history = HistoryWindow::new(vec![snapshot("2026-03-09", &[("A", 200)])]);
        let today = snapshot("2026-03-10", &[("A", 400)]);
        let analyses = analyze(&today, &history, &AnalyzerConfig::default());

        let series = build_series(&today, &history, &analyses, MissingTitlePolicy::Skip);
        assert_eq!(y_axis_max(&series), 400.0 * 1.15);

        let quiet_today = snapshot("2026-03-10", &[("A", 0)]);
        let quiet = build_series(
            &quiet_today,
            &HistoryWindow::empty(),
            &[],
            MissingTitlePolicy::Skip,
        );
        assert_eq!(y_axis_max(&quiet), 10.0);
    }

    #[test]
    fn test_marker_anchor_is_todays_point() {
        let history = HistoryWindow::new(vec![snapshot("2026-03-09", &[("A", 10)])]);
        let today = snapshot("2026-03-10", &[("A", 100)]);
        let analyses = analyze(&today, &history, &AnalyzerConfig::default());

        let series = build_series(&today, &history, &analyses, MissingTitlePolicy::Skip);

        assert!(series[0].is_anomalous);
        assert_eq!(
            series[0].today_point().unwrap(),
            ("2026-03-10".parse().unwrap(), 100.0)
        );
    }

    #[test]
    fn test_series_color_survives_legend_capture() {
        let color = series_color(0);
        let _legend = move |(x, y): (i32, i32)| {
            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
        };

        // The binding still styles the muted overlays after the capture
        assert_ne!(color.mix(0.6), series_color(1).mix(0.6));
    }
}
