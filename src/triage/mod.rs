//! Triage orchestration: fetch, extract, analyze.
//!
//! The pipeline is strictly sequential. Expected failures from the two
//! network stages never escape as errors; they are absorbed into the
//! matching [`Outcome`] variant. The seam traits exist so tests can
//! substitute doubles for the HTTP clients.

use crate::analyze::{AnalysisClient, AnalysisError};
use crate::extract;
use crate::fetch::{FetchError, LogFetcher};
use crate::models::{BuildRef, Credentials, Outcome};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Source of raw console logs.
#[async_trait]
pub trait LogSource {
    async fn fetch(
        &self,
        build: &BuildRef,
        credentials: &Credentials,
    ) -> Result<String, FetchError>;
}

/// Produces a diagnosis for an extracted report.
#[async_trait]
pub trait Analyzer {
    async fn analyze(&self, report: &str) -> Result<String, AnalysisError>;
}

#[async_trait]
impl LogSource for LogFetcher {
    async fn fetch(
        &self,
        build: &BuildRef,
        credentials: &Credentials,
    ) -> Result<String, FetchError> {
        LogFetcher::fetch(self, build, credentials).await
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(&self, report: &str) -> Result<String, AnalysisError> {
        AnalysisClient::analyze(self, report).await
    }
}

/// Run one triage pass over a build.
///
/// The build reference is validated at construction, before this is
/// called, so no network traffic can precede validation. Short-circuits
/// without touching the analyzer when there is no log or nothing
/// relevant in it.
pub async fn run(
    source: &impl LogSource,
    analyzer: &impl Analyzer,
    build: &BuildRef,
    credentials: &Credentials,
    window: usize,
) -> Outcome {
    let raw_log = match source.fetch(build, credentials).await {
        Ok(log) => log,
        Err(e) => {
            warn!("Log fetch failed: {}", e);
            return Outcome::NoLog(e.to_string());
        }
    };

    let report = extract::extract(&raw_log, window);
    if report.trim().is_empty() {
        info!("Nothing relevant found in {} log lines", raw_log.lines().count());
        return Outcome::NothingRelevant;
    }
    debug!("Extracted {} report lines", report.lines().count());

    match analyzer.analyze(&report).await {
        Ok(diagnosis) => Outcome::Diagnosis(diagnosis),
        Err(e) => {
            warn!("Analysis failed: {}", e);
            Outcome::AnalysisFailed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Log source double: serves a canned log (or error) and counts calls.
    struct StubSource {
        log: Option<String>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn with_log(log: &str) -> Self {
            Self {
                log: Some(log.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                log: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LogSource for StubSource {
        async fn fetch(
            &self,
            _build: &BuildRef,
            _credentials: &Credentials,
        ) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.log {
                Some(log) => Ok(log.clone()),
                None => Err(FetchError::Timeout(30)),
            }
        }
    }

    /// Analyzer double: records the report it was handed and counts calls.
    struct StubAnalyzer {
        reply: Result<String, u16>,
        calls: AtomicUsize,
        seen_report: Mutex<Option<String>>,
    }

    impl StubAnalyzer {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                seen_report: Mutex::new(None),
            }
        }

        fn failing_with_status(code: u16) -> Self {
            Self {
                reply: Err(code),
                calls: AtomicUsize::new(0),
                seen_report: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen_report(&self) -> Option<String> {
            self.seen_report.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Analyzer for StubAnalyzer {
        async fn analyze(&self, report: &str) -> Result<String, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_report.lock().unwrap() = Some(report.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(code) => Err(AnalysisError::Status {
                    code: *code,
                    body: String::new(),
                }),
            }
        }
    }

    fn build_ref() -> BuildRef {
        BuildRef::new("https://ci.example.com", "deploy", "7").unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_produces_diagnosis() {
        let source = StubSource::with_log("compiling\nERROR: linker failed\ndone");
        let analyzer = StubAnalyzer::replying("The linker ran out of memory.");

        let outcome = run(&source, &analyzer, &build_ref(), &Credentials::default(), 50).await;

        assert_eq!(
            outcome,
            Outcome::Diagnosis("The linker ran out of memory.".to_string())
        );
        assert_eq!(source.calls(), 1);
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn test_analyzer_receives_redacted_report() {
        let source = StubSource::with_log("ERROR: password=abc123 connection refused");
        let analyzer = StubAnalyzer::replying("ok");

        run(&source, &analyzer, &build_ref(), &Credentials::default(), 50).await;

        let report = analyzer.seen_report().unwrap();
        assert!(!report.contains("abc123"));
        assert_eq!(report, "ERROR: [REDACTED] connection refused");
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_no_log_notice() {
        let source = StubSource::failing();
        let analyzer = StubAnalyzer::replying("never used");

        let outcome = run(&source, &analyzer, &build_ref(), &Credentials::default(), 50).await;

        assert_eq!(
            outcome,
            Outcome::NoLog("request timed out after 30s".to_string())
        );
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_extraction_skips_analysis() {
        // Whitespace-only lines survive selection but trim to nothing.
        let source = StubSource::with_log("   \n\t\n  ");
        let analyzer = StubAnalyzer::replying("never used");

        let outcome = run(&source, &analyzer, &build_ref(), &Credentials::default(), 50).await;

        assert_eq!(outcome, Outcome::NothingRelevant);
        assert_eq!(source.calls(), 1);
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn test_analysis_http_500_is_tagged_failure() {
        let source = StubSource::with_log("ERROR: boom");
        let analyzer = StubAnalyzer::failing_with_status(500);

        let outcome = run(&source, &analyzer, &build_ref(), &Credentials::default(), 50).await;

        match &outcome {
            Outcome::AnalysisFailed(reason) => assert!(reason.contains("HTTP 500")),
            other => panic!("expected AnalysisFailed, got {:?}", other),
        }
        // Rendered text is distinguishable from a diagnosis.
        assert!(outcome.to_string().starts_with("analysis unavailable:"));
    }

    #[tokio::test]
    async fn test_invalid_build_ref_fails_before_any_call() {
        let source = StubSource::with_log("irrelevant");
        let analyzer = StubAnalyzer::replying("irrelevant");

        // Validation happens at construction; run() is never reached.
        let build = BuildRef::new("https://ci.example.com", "", "7");
        assert!(build.is_err());
        assert_eq!(source.calls(), 0);
        assert_eq!(analyzer.calls(), 0);
    }
}
