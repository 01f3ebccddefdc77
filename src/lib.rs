//! geo_redirect_tester library: checks geo- and bot-conditional redirect rules
//!
//! Each test case names a user agent, a country, a URL, and the expected
//! response. A probe sends one request with the country in `X-Test-Country`
//! (and a Googlebot user agent when asked), never follows redirects, and
//! compares the status and redirect target with the expectation.
//!
//! # Example
//!
//! ```no_run
//! use geo_redirect_tester::{Config, run_link_tests};
//! use tokio;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("links.testing"),
//!     max_concurrency: 8,
//!     ..Default::default()
//! };
//!
//! let report = run_link_tests(&config).await?;
//! println!("{}/{} tests passed", report.summary.passed, report.summary.total);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
pub mod error_handling;
mod evaluate;
mod filter;
pub mod initialization;
pub mod input;
mod matrix;
mod probe;
mod suite;
pub mod watch;

use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

// Re-export public API
pub use config::{Config, FailOn, LogFormat, LogLevel};
pub use error_handling::{InitializationError, LoadError, ParseError, WatchError};
pub use evaluate::{evaluate, run_test_cases, TestResult};
pub use filter::{apply_filter, evaluate_exit_code, FilterState, Summary};
pub use matrix::{run_matrix, MatrixReport, MatrixRow, MatrixRunner, MatrixSection, COUNTRIES};
pub use probe::{normalize_country, ProbeOutcome, Prober};
pub use suite::{load_test_cases, parse_test_cases, TestCase};
pub use watch::{Command, LinkTestRunner, LoopState, Report, SuiteRunner, View, WatchLoop};

/// Results of a one-shot link test run.
#[derive(Debug, Clone)]
pub struct LinkTestReport {
    /// One result per test case, in file order
    pub results: Vec<TestResult>,
    /// Pass/total counts
    pub summary: Summary,
    /// Wall-clock duration of the run
    pub elapsed_seconds: f64,
}

/// Loads `config.file` and probes every test case once.
///
/// # Errors
///
/// Fails when the file cannot be loaded, holds no test cases, or the HTTP
/// client cannot be built. Failing test cases are not errors.
pub async fn run_link_tests(config: &Config) -> Result<LinkTestReport> {
    let start = Instant::now();

    let test_cases = load_test_cases(&config.file)?;
    if test_cases.is_empty() {
        bail!("No test cases in {}", config.file.display());
    }
    info!(
        "Loaded {} test cases from {}",
        test_cases.len(),
        config.file.display()
    );

    let prober = Prober::new(config.timeout()).context("Failed to initialize HTTP client")?;
    let results = run_test_cases(&prober, test_cases, config.max_concurrency).await;
    let summary = Summary::from_results(&results);

    let elapsed_seconds = start.elapsed().as_secs_f64();
    info!(
        "Run complete: {}/{} passed in {:.1}s",
        summary.passed, summary.total, elapsed_seconds
    );
    Ok(LinkTestReport {
        results,
        summary,
        elapsed_seconds,
    })
}

/// Runs the link tests, then re-runs them whenever the test file or the
/// redirect rule file changes, until a `Quit` command arrives.
///
/// Views are published on `views` after every state change. Returns the
/// summary of the last completed run.
///
/// # Errors
///
/// Fails before the first run when the test file cannot be loaded or is
/// empty, or when either file cannot be watched. Once watching, a file that
/// fails to load is reported in the published view instead.
pub async fn watch_link_tests(
    config: &Config,
    commands: UnboundedReceiver<Command>,
    views: UnboundedSender<View>,
) -> Result<Summary, WatchError> {
    if load_test_cases(&config.file)?.is_empty() {
        return Err(WatchError::Empty {
            path: config.file.clone(),
        });
    }

    let prober = Prober::new(config.timeout())?;
    let (change_tx, change_rx) = mpsc::unbounded_channel();
    // Dropping the watcher ends the subscription
    let _watcher = watch::subscribe(&[config.file.clone(), config.rules_path.clone()], change_tx)?;
    info!(
        "Watching {} and {}",
        config.file.display(),
        config.rules_path.display()
    );

    let runner = LinkTestRunner::new(config.file.clone(), prober, config.max_concurrency);
    let summary = WatchLoop::new(runner, views, config.debounce)
        .run(change_rx, commands)
        .await;
    Ok(summary)
}

/// Probes the built-in monitor matrix once against `config.base_url`.
///
/// # Errors
///
/// Fails only when the HTTP client cannot be built.
pub async fn run_monitor(config: &Config) -> Result<MatrixReport> {
    let prober = Prober::new(config.timeout()).context("Failed to initialize HTTP client")?;
    Ok(run_matrix(&prober, &config.base_url, config.max_concurrency).await)
}

/// Probes the monitor matrix, then probes it again whenever the redirect rule
/// file changes or a `Rerun` command arrives, until a `Quit` command arrives.
///
/// Views are published on `views` after every state change. Returns the
/// summary of the last completed run, where a row passes when the server
/// answered.
///
/// # Errors
///
/// Fails before the first run when the HTTP client cannot be built or the
/// rule file cannot be watched.
pub async fn watch_monitor(
    config: &Config,
    commands: UnboundedReceiver<Command>,
    views: UnboundedSender<View<MatrixReport>>,
) -> Result<Summary, WatchError> {
    let prober = Prober::new(config.timeout())?;
    let (change_tx, change_rx) = mpsc::unbounded_channel();
    let _watcher = watch::subscribe(std::slice::from_ref(&config.rules_path), change_tx)?;
    info!(
        "Monitoring {} on changes to {}",
        config.base_url,
        config.rules_path.display()
    );

    let runner = MatrixRunner::new(prober, config.base_url.clone(), config.max_concurrency);
    let summary = WatchLoop::new(runner, views, config.debounce)
        .run(change_rx, commands)
        .await;
    Ok(summary)
}
