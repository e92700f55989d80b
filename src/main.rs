//! BuildTriage - LLM-powered CI build failure triage
//!
//! A CLI tool that fetches a failed build's console log from a CI
//! server, extracts the lines most likely to explain the failure,
//! redacts credentials, and asks a local LLM service for a diagnosis.
//!
//! Exit codes:
//!   0 - A triage outcome was printed (diagnosis or notice)
//!   1 - Runtime error (incomplete build reference, config failure, etc.)

mod analyze;
mod cli;
mod config;
mod extract;
mod fetch;
mod models;
mod triage;

use analyze::AnalysisClient;
use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use fetch::LogFetcher;
use indicatif::{ProgressBar, ProgressStyle};
use models::{BuildRef, Credentials, Outcome};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("BuildTriage v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the triage
    match run_triage(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Triage failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .buildtriage.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".buildtriage.toml");

    if path.exists() {
        eprintln!("⚠️  .buildtriage.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .buildtriage.toml")?;

    println!("✅ Created .buildtriage.toml with default settings.");
    println!("   Edit it to set the CI server, window size, and analysis endpoint.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete triage workflow. Returns the exit code.
async fn run_triage(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Assemble and validate the build reference before anything touches
    // the network.
    let build = BuildRef::new(
        &config.ci.base_url,
        args.job.as_deref().unwrap_or(""),
        args.build.as_deref().unwrap_or(""),
    )?;
    let credentials = Credentials::new(
        config.ci.username.clone(),
        args.api_token.clone().unwrap_or_default(),
    );

    let window = config.extract.window_lines;
    let timeout = config.llm.timeout_seconds;

    println!(
        "🔎 Triaging build #{} of job '{}' on {}",
        build.build, build.job, build.base_url
    );

    let fetcher = LogFetcher::new(timeout);

    // Handle --dry-run: fetch and extract, skip the analysis service.
    if args.dry_run {
        return handle_dry_run(&fetcher, &build, &credentials, window).await;
    }

    let analyzer = AnalysisClient::new(config.llm.url.clone(), timeout);
    info!("Analysis endpoint: {}", config.llm.url);

    let spinner = make_spinner(args.quiet);
    let outcome = triage::run(&fetcher, &analyzer, &build, &credentials, window).await;
    spinner.finish_and_clear();

    print_outcome(&outcome);
    Ok(0)
}

/// Handle --dry-run: fetch the log, print the redacted report, exit.
async fn handle_dry_run(
    fetcher: &LogFetcher,
    build: &BuildRef,
    credentials: &Credentials,
    window: usize,
) -> Result<i32> {
    println!("\n🔍 Dry run: extracting report (no LLM call)...\n");

    let raw_log = match fetcher.fetch(build, credentials).await {
        Ok(log) => log,
        Err(e) => {
            print_outcome(&Outcome::NoLog(e.to_string()));
            return Ok(0);
        }
    };

    let report = extract::extract(&raw_log, window);
    if report.trim().is_empty() {
        print_outcome(&Outcome::NothingRelevant);
        return Ok(0);
    }

    println!("{}", report);
    println!(
        "\n✅ Dry run complete. {} report lines, no LLM calls were made.",
        report.lines().count()
    );
    Ok(0)
}

/// Print one triage outcome to the console.
fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Diagnosis(text) => {
            println!("\n🩺 Diagnosis:\n{}", text);
        }
        Outcome::AnalysisFailed(_) => {
            warn!("Analysis service did not produce a diagnosis");
            println!("\n⚠️  {}", outcome);
        }
        Outcome::NoLog(_) => {
            println!("\n⚠️  {}", outcome);
        }
        Outcome::NothingRelevant => {
            println!("\nℹ️  {}", outcome);
        }
    }
}

/// Spinner shown while the network calls are in flight.
fn make_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("Failed to build spinner style"),
    );
    spinner.set_message("Fetching and analyzing console log...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .buildtriage.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
