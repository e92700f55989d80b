//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// BuildTriage - LLM-powered failure triage for CI build console logs
///
/// Fetch a failed build's console log, extract the lines most likely to
/// explain the failure, redact credentials, and ask a local LLM service
/// for a diagnosis.
///
/// Examples:
///   buildtriage --ci-url https://ci.example.com --job deploy --build 128
///   buildtriage --job deploy --build 128 --window 80 --dry-run
///   FAILED_JOB_NAME=deploy FAILED_BUILD_NUMBER=128 buildtriage --ci-url https://ci.example.com
///   buildtriage --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CI server base URL
    ///
    /// Root address of the CI server, e.g. https://ci.example.com.
    /// Can also be set via .buildtriage.toml or CI_BASE_URL.
    #[arg(long, value_name = "URL", env = "CI_BASE_URL")]
    pub ci_url: Option<String>,

    /// Name of the failed CI job
    #[arg(short, long, value_name = "NAME", env = "FAILED_JOB_NAME")]
    pub job: Option<String>,

    /// Build number of the failed run
    #[arg(short, long, value_name = "NUMBER", env = "FAILED_BUILD_NUMBER")]
    pub build: Option<String>,

    /// CI basic-auth username
    #[arg(short, long, value_name = "USER", env = "CI_USER")]
    pub user: Option<String>,

    /// CI API token for basic auth
    ///
    /// Never written to the config file and never logged.
    #[arg(long, value_name = "TOKEN", env = "CI_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Analysis service endpoint URL
    ///
    /// Defaults to http://llm-api-container:8000/predict.
    #[arg(long, value_name = "URL", env = "LLM_API_URL")]
    pub llm_url: Option<String>,

    /// Tail window size in lines
    ///
    /// The last N log lines are always included in the report,
    /// regardless of content. Default: 50.
    #[arg(short, long, value_name = "LINES")]
    pub window: Option<usize>,

    /// Request timeout in seconds for both HTTP calls
    ///
    /// Default: from config or 30s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .buildtriage.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: fetch and extract without calling the analysis service
    ///
    /// Prints the redacted report and exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .buildtriage.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    ///
    /// Completeness of the build reference itself (job, build number,
    /// base URL) is checked separately, before any network call.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate CI URL format when provided
        if let Some(ref ci_url) = self.ci_url {
            if !ci_url.starts_with("http://") && !ci_url.starts_with("https://") {
                return Err("CI URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate analysis URL format (not needed for dry-run)
        if !self.dry_run {
            if let Some(ref llm_url) = self.llm_url {
                if !llm_url.starts_with("http://") && !llm_url.starts_with("https://") {
                    return Err(
                        "Analysis URL must start with 'http://' or 'https://'".to_string()
                    );
                }
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
