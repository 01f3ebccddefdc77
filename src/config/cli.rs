//! Command-line interface definitions.
//!
//! Lives in the library (not `main.rs`) so the argument surface can be parsed
//! in tests with `Cli::try_parse_from`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENCY, DEFAULT_RULES_PATH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_WATCH_LOG_FILE,
};
use crate::config::types::{Config, FailOn, LogFormat, LogLevel};

/// Geo-redirection rule tester.
#[derive(Debug, Parser)]
#[command(name = "geo_redirect_tester", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the test cases from a CSV file (Agent, Country, URL, ExpectedStatus, ExpectedResult)
    Test(TestArgs),
    /// Probe the built-in country/agent matrix against a server, again on every rule file change
    Monitor(MonitorArgs),
}

#[derive(Debug, Args)]
pub struct TestArgs {
    /// Test definition file
    pub file: PathBuf,

    /// Re-run on changes to the test file or the redirect rule file
    #[arg(long)]
    pub watch: bool,

    /// Redirect rule file to watch in watch mode
    #[arg(long, default_value = DEFAULT_RULES_PATH)]
    pub rules_path: PathBuf,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Maximum concurrent probes
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// When failing test results make the process exit non-zero
    #[arg(long, value_enum, default_value_t = FailOn::Never)]
    pub fail_on: FailOn,

    /// Failure percentage threshold for `--fail-on pct-greater-than`
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub fail_on_pct_threshold: u8,

    /// Log file used in watch mode
    #[arg(long, default_value = DEFAULT_WATCH_LOG_FILE)]
    pub log_file: PathBuf,
}

#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Server to probe
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Maximum concurrent probes
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Probe once, print the matrix, and exit
    #[arg(long)]
    pub once: bool,

    /// Redirect rule file to watch
    #[arg(long, default_value = DEFAULT_RULES_PATH)]
    pub rules_path: PathBuf,

    /// Log file used while the live view is on screen
    #[arg(long, default_value = DEFAULT_WATCH_LOG_FILE)]
    pub log_file: PathBuf,
}

impl Cli {
    /// Builds the library configuration for the selected subcommand.
    pub fn to_config(&self) -> Config {
        let base = Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            ..Default::default()
        };
        match &self.command {
            CliCommand::Test(args) => Config {
                file: args.file.clone(),
                rules_path: args.rules_path.clone(),
                timeout_seconds: args.timeout_seconds,
                max_concurrency: args.max_concurrency.max(1),
                ..base
            },
            CliCommand::Monitor(args) => Config {
                base_url: args.base_url.clone(),
                rules_path: args.rules_path.clone(),
                timeout_seconds: args.timeout_seconds,
                max_concurrency: args.max_concurrency.max(1),
                ..base
            },
        }
    }
}
