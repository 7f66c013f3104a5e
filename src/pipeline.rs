//! Daily report pipeline
//!
//! One invocation = one run: read the manual input snapshot, archive it,
//! load the trailing history, analyze, render the digest and chart, and
//! push. Failures are classified so the binary can map them to exit
//! codes; chart failures are downgraded to a report without an image.

use crate::analysis::{analyze, generate_ideas, AnalyzerConfig, NoteIdeas};
use crate::config::Config;
use crate::input::{read_notes, InputError};
use crate::notify::{NotifyError, PushClient, PushConfig};
use crate::report::{render_digest, render_trend_chart, PUSH_TITLE};
use crate::storage::{DailySnapshot, HistoryWindow, SnapshotStore, StorageError};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Per-invocation options, set from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Treat this date as "today" instead of the wall clock (backfills)
    pub date: Option<NaiveDate>,
    /// Archive and render but do not push
    pub skip_push: bool,
    /// Skip chart rendering for this run
    pub no_chart: bool,
}

/// What one completed run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub notes: usize,
    pub anomalies: usize,
    /// Title of the day's top note by like delta, if any were ranked
    pub top_title: Option<String>,
    pub archived_to: PathBuf,
    pub chart: Option<PathBuf>,
    pub delivered: bool,
    pub duration_ms: u64,
}

/// Run failures, grouped by how the binary reports them
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Input failed: {0}")]
    Input(#[from] InputError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] NotifyError),
}

/// Execute one daily report run.
///
/// The snapshot is archived before anything that can fail downstream, so
/// a delivery failure still leaves the day's data on disk. Delivery
/// failures surface as [`RunError::Delivery`] after the summary has been
/// logged.
pub async fn run_daily_report(
    config: &Config,
    options: RunOptions,
) -> Result<RunSummary, RunError> {
    let started = std::time::Instant::now();

    let notes = read_notes(Path::new(&config.input.path))?;

    let snapshot = match options.date {
        Some(date) => DailySnapshot::with_timestamp(notes, date.and_time(Local::now().time())),
        None => DailySnapshot::new(notes),
    };
    let today = snapshot.date();
    info!(date = %today, notes = snapshot.len(), "Starting daily report");

    let store = SnapshotStore::new(&config.storage.data_dir);
    let archived_to = store.save(&snapshot)?;

    // History is loaded after the save; the range ends before today, so
    // today's own file never feeds its own baseline.
    let history = HistoryWindow::new(store.load_range(today, config.analysis.history_days)?);

    let analyzer_config = AnalyzerConfig {
        windows: config.analysis.windows.clone(),
        anomaly_factor: config.analysis.anomaly_factor,
        top_k: config.analysis.top_k,
        missing_title: config.analysis.missing_title,
    };
    let analyses = analyze(&snapshot, &history, &analyzer_config);
    let anomalies = analyses.iter().filter(|a| a.is_anomalous).count();
    if anomalies > 0 {
        info!("Detected {} spiking note(s) today", anomalies);
    }

    let ideas: Vec<NoteIdeas> = analyses
        .iter()
        .filter(|a| a.is_anomalous)
        .map(|a| generate_ideas(&a.note.title, config.analysis.ideas_per_note))
        .collect();

    let chart = if config.chart.enabled && !options.no_chart {
        match render_trend_chart(
            &config.chart_dir(),
            &snapshot,
            &history,
            &analyses,
            config.analysis.missing_title,
        ) {
            Ok(path) => path,
            Err(e) => {
                warn!("Chart rendering failed, sending digest without it: {}", e);
                None
            }
        }
    } else {
        None
    };

    let digest = render_digest(&snapshot, &analyses, &ideas, &archived_to);

    let mut delivered = false;
    let mut delivery_error = None;
    if config.notify.enabled && !options.skip_push {
        let client = PushClient::new(PushConfig {
            base_url: config.notify.base_url.clone(),
            key: config.notify.key.clone(),
            timeout_secs: config.notify.timeout_secs,
        });
        match client.deliver(PUSH_TITLE, &digest, chart.as_deref()).await {
            Ok(()) => delivered = true,
            Err(e) => {
                error!("Push delivery failed: {}", e);
                delivery_error = Some(e);
            }
        }
    } else {
        info!("Push delivery skipped");
    }

    let summary = RunSummary {
        date: today,
        notes: snapshot.len(),
        anomalies,
        top_title: analyses
            .iter()
            .find(|a| a.is_top_of_day())
            .map(|a| a.note.title.clone()),
        archived_to,
        chart,
        delivered,
        duration_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        date = %summary.date,
        notes = summary.notes,
        anomalies = summary.anomalies,
        delivered = summary.delivered,
        duration_ms = summary.duration_ms,
        "Daily report complete"
    );

    match delivery_error {
        Some(e) => Err(RunError::Delivery(e)),
        None => Ok(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.join("data").to_string_lossy().to_string();
        config.input.path = dir.join("input.json").to_string_lossy().to_string();
        config.chart.enabled = false;
        config.notify.enabled = false;
        config
    }

    fn write_input(config: &Config, json: &str) {
        std::fs::write(&config.input.path, json).unwrap();
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn options_for(day: &str) -> RunOptions {
        RunOptions {
            date: Some(date(day)),
            ..RunOptions::default()
        }
    }

    #[tokio::test]
    async fn test_run_archives_and_summarizes() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        write_input(
            &config,
            r#"[{"title":"A","like":320,"collect":10,"comment":5},
               {"title":"B","like":4,"collect":0,"comment":0}]"#,
        );

        let summary = run_daily_report(&config, options_for("2026-03-10"))
            .await
            .unwrap();

        assert_eq!(summary.date, date("2026-03-10"));
        assert_eq!(summary.notes, 2);
        assert!(!summary.delivered);
        assert!(summary.chart.is_none());
        assert!(summary.archived_to.ends_with("2026-03-10.json"));
        assert!(summary.archived_to.exists());
    }

    #[tokio::test]
    async fn test_rerun_same_date_overwrites() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        write_input(&config, r#"[{"title":"A","like":10,"collect":1,"comment":0}]"#);

        run_daily_report(&config, options_for("2026-03-10"))
            .await
            .unwrap();
        run_daily_report(&config, options_for("2026-03-10"))
            .await
            .unwrap();

        let entries = std::fs::read_dir(&config.storage.data_dir).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_run_detects_spike_against_yesterday() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let store = SnapshotStore::new(&config.storage.data_dir);
        store
            .save(&DailySnapshot::with_timestamp(
                vec![crate::storage::NoteMetric::new("A", 100, 30, 10)],
                date("2026-03-09").and_hms_opt(9, 0, 0).unwrap(),
            ))
            .unwrap();

        write_input(&config, r#"[{"title":"A","like":320,"collect":40,"comment":12}]"#);
        let summary = run_daily_report(&config, options_for("2026-03-10"))
            .await
            .unwrap();

        // 320 > 100 * 1.5
        assert_eq!(summary.anomalies, 1);
        assert_eq!(summary.top_title.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_missing_input_runs_on_placeholder() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());

        let summary = run_daily_report(&config, options_for("2026-03-10"))
            .await
            .unwrap();

        assert_eq!(summary.notes, 1);
        // Cold start: any likes beat the zero average
        assert_eq!(summary.anomalies, 1);
    }

    #[tokio::test]
    async fn test_skip_push_never_delivers() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.notify.enabled = true;
        config.notify.key = Some("SCT_TEST".to_string());
        write_input(&config, r#"[{"title":"A","like":1,"collect":0,"comment":0}]"#);

        let summary = run_daily_report(
            &config,
            RunOptions {
                date: Some(date("2026-03-10")),
                skip_push: true,
                ..RunOptions::default()
            },
        )
        .await
        .unwrap();

        assert!(!summary.delivered);
    }

    #[tokio::test]
    async fn test_missing_key_is_a_delivery_failure_after_archiving() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.notify.enabled = true;
        write_input(&config, r#"[{"title":"A","like":1,"collect":0,"comment":0}]"#);

        let result = run_daily_report(&config, options_for("2026-03-10")).await;

        assert!(matches!(
            result,
            Err(RunError::Delivery(NotifyError::MissingKey))
        ));
        // The snapshot was archived before delivery was attempted
        assert!(Path::new(&config.storage.data_dir)
            .join("2026-03-10.json")
            .exists());
    }

    #[tokio::test]
    async fn test_malformed_input_is_an_input_failure() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        write_input(&config, "not json at all");

        let result = run_daily_report(&config, options_for("2026-03-10")).await;

        assert!(matches!(result, Err(RunError::Input(_))));
        assert!(!Path::new(&config.storage.data_dir).exists());
    }
}
