//! Data models for the build triage pipeline.
//!
//! This module contains the request-scoped values passed between the
//! pipeline stages. Nothing here is mutated after creation; each stage
//! produces a new value consumed by the next.

use std::fmt;
use thiserror::Error;

/// Errors raised while assembling the build reference from configuration.
///
/// These fail fast, before any network call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No CI server base URL was supplied.
    #[error("CI base URL is missing (set --ci-url or CI_BASE_URL)")]
    MissingBaseUrl,
    /// No job name was supplied.
    #[error("job name is missing (set --job or FAILED_JOB_NAME)")]
    MissingJobName,
    /// No build number was supplied.
    #[error("build number is missing (set --build or FAILED_BUILD_NUMBER)")]
    MissingBuildNumber,
}

/// Identifies one build on the CI server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRef {
    /// Server base address, trailing slashes stripped.
    pub base_url: String,
    /// CI job identifier.
    pub job: String,
    /// Build number within the job.
    pub build: String,
}

impl BuildRef {
    /// Create a validated build reference.
    ///
    /// All three fields must be non-empty; there is no partial
    /// construction. Trailing slashes on the base URL are stripped so
    /// URL joining stays predictable.
    pub fn new(base_url: &str, job: &str, build: &str) -> Result<Self, ConfigError> {
        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        if job.trim().is_empty() {
            return Err(ConfigError::MissingJobName);
        }
        if build.trim().is_empty() {
            return Err(ConfigError::MissingBuildNumber);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            job: job.to_string(),
            build: build.to_string(),
        })
    }
}

/// Basic-auth credentials for the CI server.
///
/// Opaque pass-through values. The token is masked in `Debug` output so
/// it cannot reach logs.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"***")
            .finish()
    }
}

/// Final user-facing outcome of one triage run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The analysis service returned a diagnosis (possibly empty).
    Diagnosis(String),
    /// The analysis service could not be reached or replied with an
    /// error. Tagged distinctly so a transport failure cannot be
    /// mistaken for a genuine diagnosis.
    AnalysisFailed(String),
    /// The console log could not be retrieved, or was empty. Carries
    /// the absorbed fetch failure reason.
    NoLog(String),
    /// The log was fetched but no tail or signal lines survived
    /// extraction.
    NothingRelevant,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Diagnosis(text) => write!(f, "{}", text),
            Outcome::AnalysisFailed(reason) => write!(f, "analysis unavailable: {}", reason),
            Outcome::NoLog(reason) => write!(f, "could not retrieve console log: {}", reason),
            Outcome::NothingRelevant => {
                write!(f, "no relevant error lines found in the console log")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ref_strips_trailing_slashes() {
        let build = BuildRef::new("https://ci.example.com///", "deploy", "42").unwrap();
        assert_eq!(build.base_url, "https://ci.example.com");
        assert_eq!(build.job, "deploy");
        assert_eq!(build.build, "42");
    }

    #[test]
    fn test_build_ref_rejects_missing_fields() {
        assert_eq!(
            BuildRef::new("", "deploy", "42"),
            Err(ConfigError::MissingBaseUrl)
        );
        assert_eq!(
            BuildRef::new("https://ci.example.com", "", "42"),
            Err(ConfigError::MissingJobName)
        );
        assert_eq!(
            BuildRef::new("https://ci.example.com", "deploy", "  "),
            Err(ConfigError::MissingBuildNumber)
        );
    }

    #[test]
    fn test_credentials_debug_masks_token() {
        let creds = Credentials::new("training", "s3cr3t-token");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("training"));
        assert!(!debug.contains("s3cr3t-token"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_outcome_display() {
        let failed = Outcome::AnalysisFailed("HTTP 500".to_string());
        assert_eq!(failed.to_string(), "analysis unavailable: HTTP 500");

        let diagnosis = Outcome::Diagnosis("The build ran out of disk space.".to_string());
        assert_eq!(diagnosis.to_string(), "The build ran out of disk space.");

        let no_log = Outcome::NoLog("request timed out after 30s".to_string());
        assert!(no_log
            .to_string()
            .starts_with("could not retrieve console log:"));
    }
}
