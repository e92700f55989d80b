//! Console log retrieval from the CI server.
//!
//! One authenticated GET against the CI server's fixed console-text
//! endpoint, with a bounded timeout and no retries. Failures come back
//! as a typed [`FetchError`] so the caller can tell a timeout from an
//! auth rejection from an empty log.

use crate::models::{BuildRef, Credentials};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Default request timeout for the console-log fetch.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Why the console log could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot connect to CI server at {0}")]
    Connect(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("CI server returned HTTP {0}")]
    Status(u16),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("console log is empty")]
    EmptyLog,
}

/// Fetches one build's console log over HTTP basic auth.
pub struct LogFetcher {
    http_client: reqwest::Client,
    timeout_seconds: u64,
}

impl LogFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout_seconds: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            timeout_seconds,
        }
    }

    /// Console-text URL for a build: `{base}/job/{job}/{build}/consoleText`.
    pub fn console_url(build: &BuildRef) -> String {
        format!(
            "{}/job/{}/{}/consoleText",
            build.base_url, build.job, build.build
        )
    }

    /// Fetch the raw console log for one build.
    ///
    /// Performs a single GET with basic auth; no retries. Non-2xx
    /// statuses and empty bodies are errors.
    pub async fn fetch(
        &self,
        build: &BuildRef,
        credentials: &Credentials,
    ) -> Result<String, FetchError> {
        let url = Self::console_url(build);
        info!("Fetching console log: {}", url);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.token))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    FetchError::Connect(build.base_url.clone())
                } else {
                    FetchError::Body(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        if body.is_empty() {
            return Err(FetchError::EmptyLog);
        }

        debug!("Fetched {} bytes of console log", body.len());
        Ok(body)
    }
}

impl Default for LogFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_ref() -> BuildRef {
        BuildRef::new("https://ci.example.com", "nightly-deploy", "128").unwrap()
    }

    #[test]
    fn test_console_url_layout() {
        assert_eq!(
            LogFetcher::console_url(&build_ref()),
            "https://ci.example.com/job/nightly-deploy/128/consoleText"
        );
    }

    #[test]
    fn test_console_url_after_trailing_slash_strip() {
        let build = BuildRef::new("https://ci.example.com/", "deploy", "1").unwrap();
        assert_eq!(
            LogFetcher::console_url(&build),
            "https://ci.example.com/job/deploy/1/consoleText"
        );
    }

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(
            FetchError::Timeout(30).to_string(),
            "request timed out after 30s"
        );
        assert_eq!(
            FetchError::Status(401).to_string(),
            "CI server returned HTTP 401"
        );
        assert_eq!(FetchError::EmptyLog.to_string(), "console log is empty");
    }
}
