//! Client for the text-analysis (LLM) service.
//!
//! Wraps the extracted report in a fixed instruction prompt, POSTs it as
//! JSON to the configured endpoint, and returns the `response` field of
//! the reply. One request, bounded timeout, no retries.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Default analysis endpoint, overridable via `LLM_API_URL` or `--llm-url`.
pub const DEFAULT_LLM_URL: &str = "http://llm-api-container:8000/predict";

/// Default request timeout for the analysis call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Instruction prefixed to the extracted log lines.
const PROMPT_INSTRUCTION: &str =
    "These are the relevant console log lines of a failed CI build. \
     Explain the most likely cause of the failure:\n\n";

/// Why the analysis service produced no diagnosis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("cannot connect to analysis service at {0}")]
    Connect(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("analysis service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("malformed reply from analysis service: {0}")]
    MalformedReply(String),
}

/// Analysis API request body.
#[derive(Debug, Serialize)]
struct PredictRequest {
    prompt: String,
}

/// Analysis API reply. A missing `response` field is treated as an
/// empty diagnosis, not an error.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    response: String,
}

/// Sends extracted reports to the analysis service.
pub struct AnalysisClient {
    url: String,
    http_client: reqwest::Client,
    timeout_seconds: u64,
}

impl AnalysisClient {
    /// Create a client for the given endpoint and request timeout.
    pub fn new(url: impl Into<String>, timeout_seconds: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: url.into(),
            http_client,
            timeout_seconds,
        }
    }

    /// Build the prompt sent to the analysis service.
    pub fn build_prompt(report: &str) -> String {
        format!("{}{}", PROMPT_INSTRUCTION, report)
    }

    /// Ask the analysis service for a diagnosis of the extracted report.
    pub async fn analyze(&self, report: &str) -> Result<String, AnalysisError> {
        info!("Requesting analysis from {}", self.url);

        let request = PredictRequest {
            prompt: Self::build_prompt(report),
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    AnalysisError::Connect(self.url.clone())
                } else {
                    AnalysisError::MalformedReply(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status { code, body });
        }

        let reply: PredictResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedReply(e.to_string()))?;

        debug!("Analysis reply: {} chars", reply.response.len());
        Ok(reply.response)
    }
}

impl Default for AnalysisClient {
    fn default() -> Self {
        Self::new(DEFAULT_LLM_URL, DEFAULT_TIMEOUT_SECONDS)
    }
}
