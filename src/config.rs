//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::analysis::MissingTitlePolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot archive configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Input snapshot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: String,
}

fn default_input_path() -> String {
    "manual/input.json".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

/// Analyzer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Days of history loaded for each run
    #[serde(default = "default_history_days")]
    pub history_days: u32,

    /// Moving-average windows to report, in days
    #[serde(default = "default_windows")]
    pub windows: Vec<u32>,

    /// Spike threshold multiplier over the 7-day average
    #[serde(default = "default_anomaly_factor")]
    pub anomaly_factor: f64,

    /// Notes ranked per day by like delta
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Replication ideas generated per spiking note
    #[serde(default = "default_ideas_per_note")]
    pub ideas_per_note: usize,

    /// Contribution of stored days that lack a title: "skip" or
    /// "count_as_zero"
    #[serde(default)]
    pub missing_title: MissingTitlePolicy,
}

fn default_history_days() -> u32 {
    14
}

fn default_windows() -> Vec<u32> {
    vec![7, 14]
}

fn default_anomaly_factor() -> f64 {
    1.5
}

fn default_top_k() -> usize {
    3
}

fn default_ideas_per_note() -> usize {
    3
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            windows: default_windows(),
            anomaly_factor: default_anomaly_factor(),
            top_k: default_top_k(),
            ideas_per_note: default_ideas_per_note(),
            missing_title: MissingTitlePolicy::default(),
        }
    }
}

/// Trend chart configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_enabled")]
    pub enabled: bool,

    /// Output directory; `<data_dir>/charts` when unset
    pub dir: Option<String>,
}

fn default_chart_enabled() -> bool {
    true
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: default_chart_enabled(),
            dir: None,
        }
    }
}

/// Push notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_enabled")]
    pub enabled: bool,

    #[serde(default = "default_push_base_url")]
    pub base_url: String,

    /// Send key; prefer the NOTEPULSE_PUSH_KEY environment variable
    pub key: Option<String>,

    #[serde(default = "default_push_timeout")]
    pub timeout_secs: u64,
}

fn default_notify_enabled() -> bool {
    true
}

fn default_push_base_url() -> String {
    "https://sctapi.ftqq.com".to_string()
}

fn default_push_timeout() -> u64 {
    10
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_notify_enabled(),
            base_url: default_push_base_url(),
            key: None,
            timeout_secs: default_push_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Runs before the tracing subscriber exists, so nothing is logged
    /// here; the returned [`ConfigSource`] tells the caller what was
    /// resolved and which files were skipped, for reporting afterwards.
    pub fn load_default() -> (Self, ConfigSource) {
        let candidates: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("notepulse").join("config.toml")),
            Some(PathBuf::from("/etc/notepulse/config.toml")),
            Some(PathBuf::from("./notepulse.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&candidates)
    }

    /// Probe candidate paths in order; the first file that loads wins.
    fn load_first(candidates: &[PathBuf]) -> (Self, ConfigSource) {
        let mut skipped = Vec::new();

        for path in candidates {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        let source = ConfigSource {
                            path: Some(path.clone()),
                            skipped,
                        };
                        return (config, source);
                    }
                    Err(e) => skipped.push((path.clone(), e)),
                }
            }
        }

        // Fall back to environment-only config
        (Self::from_env(), ConfigSource { path: None, skipped })
    }

    /// Chart output directory, derived from the data dir when unset
    pub fn chart_dir(&self) -> PathBuf {
        match &self.chart.dir {
            Some(dir) => PathBuf::from(dir),
            None => Path::new(&self.storage.data_dir).join("charts"),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Storage overrides
        if let Ok(data_dir) = std::env::var("NOTEPULSE_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // Input overrides
        if let Ok(path) = std::env::var("NOTEPULSE_INPUT") {
            self.input.path = path;
        }

        // Push overrides; SERVERCHAN_KEY is the legacy variable name
        if let Ok(key) = std::env::var("NOTEPULSE_PUSH_KEY") {
            self.notify.key = Some(key);
        } else if let Ok(key) = std::env::var("SERVERCHAN_KEY") {
            self.notify.key = Some(key);
        }
        if let Ok(url) = std::env::var("NOTEPULSE_PUSH_URL") {
            self.notify.base_url = url;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("NOTEPULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("NOTEPULSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            input: InputConfig::default(),
            analysis: AnalysisConfig::default(),
            chart: ChartConfig::default(),
            notify: NotifyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// How the configuration was resolved, for reporting after logging init
#[derive(Debug)]
pub struct ConfigSource {
    /// File the config came from; `None` means built-in defaults plus
    /// environment overrides
    pub path: Option<PathBuf>,
    /// Files that existed but failed to load, in probe order
    pub skipped: Vec<(PathBuf, ConfigError)>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Notepulse Configuration
#
# Environment variables override these settings:
# - NOTEPULSE_DATA_DIR
# - NOTEPULSE_INPUT
# - NOTEPULSE_PUSH_KEY (or legacy SERVERCHAN_KEY)
# - NOTEPULSE_PUSH_URL
# - NOTEPULSE_LOG_LEVEL
# - NOTEPULSE_LOG_FORMAT

[storage]
# Directory for archived daily snapshots
data_dir = "data"

[input]
# Manually maintained metrics file read at the start of each run
path = "manual/input.json"

[analysis]
# Days of history loaded for each run
history_days = 14

# Moving-average windows to report (days)
windows = [7, 14]

# Spike threshold: anomalous when likes > 7-day average * factor
anomaly_factor = 1.5

# Notes ranked per day by like delta
top_k = 3

# Replication ideas generated per spiking note
ideas_per_note = 3

# How a stored day without the title counts toward averages:
# "skip" or "count_as_zero"
missing_title = "skip"

[chart]
# Render the trend chart and reference it from the push message
enabled = true

# Output directory; defaults to <data_dir>/charts
# dir = "data/charts"

[notify]
# Deliver the digest via a ServerChan-compatible push endpoint
enabled = true

# Push API base URL
base_url = "https://sctapi.ftqq.com"

# Send key; prefer the NOTEPULSE_PUSH_KEY environment variable
# key = "SCT..."

# Request timeout in seconds
timeout_secs = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/notepulse/notepulse.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.input.path, "manual/input.json");
        assert_eq!(config.analysis.history_days, 14);
        assert_eq!(config.analysis.windows, vec![7, 14]);
        assert_eq!(config.analysis.anomaly_factor, 1.5);
        assert_eq!(config.analysis.top_k, 3);
        assert_eq!(config.analysis.missing_title, MissingTitlePolicy::Skip);
        assert!(config.chart.enabled);
        assert!(config.notify.enabled);
        assert!(config.notify.key.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            data_dir = "/tmp/archive"

            [analysis]
            anomaly_factor = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, "/tmp/archive");
        assert_eq!(config.analysis.anomaly_factor, 2.0);
        // Untouched sections and fields fall back to defaults
        assert_eq!(config.analysis.windows, vec![7, 14]);
        assert_eq!(config.input.path, "manual/input.json");
    }

    #[test]
    fn test_missing_title_policy_parses() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            missing_title = "count_as_zero"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.analysis.missing_title,
            MissingTitlePolicy::CountAsZero
        );
    }

    #[test]
    fn test_chart_dir_derived_from_data_dir() {
        let mut config = Config::default();
        assert_eq!(config.chart_dir(), PathBuf::from("data/charts"));

        config.chart.dir = Some("/var/charts".to_string());
        assert_eq!(config.chart_dir(), PathBuf::from("/var/charts"));
    }

    #[test]
    fn test_default_template_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.notify.base_url, "https://sctapi.ftqq.com");
        assert_eq!(config.notify.timeout_secs, 10);
    }

    #[test]
    fn test_load_first_reports_skipped_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "not = [").unwrap();
        std::fs::write(&good, "[analysis]\nanomaly_factor = 2.5\n").unwrap();

        let candidates = vec![dir.path().join("missing.toml"), broken.clone(), good.clone()];
        let (config, source) = Config::load_first(&candidates);

        // The broken file is skipped, not fatal, and the caller can see it
        assert_eq!(config.analysis.anomaly_factor, 2.5);
        assert_eq!(source.path, Some(good));
        assert_eq!(source.skipped.len(), 1);
        assert_eq!(source.skipped[0].0, broken);
        assert!(matches!(source.skipped[0].1, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_first_without_files_falls_back() {
        let dir = tempfile::tempdir().unwrap();

        let (config, source) = Config::load_first(&[dir.path().join("none.toml")]);

        assert_eq!(config.analysis.anomaly_factor, 1.5);
        assert!(source.path.is_none());
        assert!(source.skipped.is_empty());
    }
}
