//! ServerChan push client
//!
//! Delivers the daily digest over the ServerChan-compatible push API:
//! a single key-authenticated POST of `title` and `desp` form fields.
//! Best-effort by contract, so there are no retries; the caller decides
//! what a failed delivery means for the run.

use reqwest::Client;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Push client over the ServerChan wire protocol
pub struct PushClient {
    client: Client,
    config: PushConfig,
}

/// Configuration for the push client
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Push API base URL, without the key segment
    pub base_url: String,
    /// Secret send key; never logged
    pub key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sctapi.ftqq.com".to_string(),
            key: None,
            timeout_secs: 10,
        }
    }
}

impl PushClient {
    /// Create a new push client with the given configuration
    pub fn new(config: PushConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Get the current configuration
    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Deliver one digest, optionally referencing a chart image.
    ///
    /// The endpoint takes no binary uploads; the attachment is embedded
    /// as a markdown image reference at the end of the body.
    pub async fn deliver(
        &self,
        title: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> Result<(), NotifyError> {
        let key = match self.config.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(NotifyError::MissingKey),
        };

        let url = self.endpoint_url(key);
        let desp = compose_body(body, attachment);

        let response = self
            .client
            .post(&url)
            .form(&[("title", title), ("desp", desp.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout
                } else if e.is_connect() {
                    NotifyError::Unavailable
                } else {
                    NotifyError::Request(e)
                }
            })?;

        if response.status().is_success() {
            debug!(status = %response.status(), "Push delivered");
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(NotifyError::ApiError {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// Full send URL for a key. The key is a path segment, not a query
    /// parameter.
    fn endpoint_url(&self, key: &str) -> String {
        format!("{}/{}.send", self.config.base_url.trim_end_matches('/'), key)
    }
}

/// Append the chart reference to the digest body, when there is one
fn compose_body(body: &str, attachment: Option<&Path>) -> String {
    match attachment {
        Some(path) => format!("{}\n\n![trend]({})", body, path.display()),
        None => body.to_string(),
    }
}

/// Errors that can occur when delivering a push message
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("No push key configured")]
    MissingKey,

    #[error("Push endpoint unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Push API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,
}
