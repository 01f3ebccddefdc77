//! Tests for CLI subcommand parsing.

use clap::Parser;
use geo_redirect_tester::config::{Cli, CliCommand};
use geo_redirect_tester::{FailOn, LogFormat, LogLevel};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_cli_test_command_defaults() {
    let args = ["geo_redirect_tester", "test", "links.testing"];
    let cli = Cli::try_parse_from(args.iter()).expect("Should parse test command");

    match &cli.command {
        CliCommand::Test(cmd) => {
            assert_eq!(cmd.file, PathBuf::from("links.testing"));
            assert!(!cmd.watch);
            assert_eq!(cmd.rules_path, PathBuf::from("../../.htaccess"));
            assert_eq!(cmd.timeout_seconds, 5);
            assert_eq!(cmd.max_concurrency, 16);
            assert_eq!(cmd.fail_on, FailOn::Never);
            assert_eq!(cmd.fail_on_pct_threshold, 10);
            assert_eq!(cmd.log_file, PathBuf::from("geo_redirect_tester.log"));
        }
        CliCommand::Monitor(_) => panic!("Expected Test command"),
    }
    // LogLevel doesn't implement PartialEq, so we compare via conversion
    assert_eq!(
        log::LevelFilter::from(cli.log_level.clone()),
        log::LevelFilter::from(LogLevel::Info)
    );
    assert!(matches!(cli.log_format, LogFormat::Plain));
}

#[test]
fn test_cli_test_command_with_flags() {
    let args = [
        "geo_redirect_tester",
        "test",
        "links.testing",
        "--watch",
        "--rules-path",
        "/var/www/.htaccess",
        "--timeout-seconds",
        "2",
        "--fail-on",
        "pct-greater-than",
        "--fail-on-pct-threshold",
        "25",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ];
    let cli = Cli::try_parse_from(args.iter()).expect("Should parse test command with flags");

    match &cli.command {
        CliCommand::Test(cmd) => {
            assert!(cmd.watch);
            assert_eq!(cmd.rules_path, PathBuf::from("/var/www/.htaccess"));
            assert_eq!(cmd.fail_on, FailOn::PctGreaterThan);
            assert_eq!(cmd.fail_on_pct_threshold, 25);
        }
        CliCommand::Monitor(_) => panic!("Expected Test command"),
    }
    assert_eq!(
        log::LevelFilter::from(cli.log_level.clone()),
        log::LevelFilter::Debug
    );
    assert!(matches!(cli.log_format, LogFormat::Json));

    let config = cli.to_config();
    assert_eq!(config.timeout(), Duration::from_secs(2));
    assert_eq!(config.rules_path, PathBuf::from("/var/www/.htaccess"));
}

#[test]
fn test_cli_fail_on_threshold_out_of_range_rejected() {
    let args = [
        "geo_redirect_tester",
        "test",
        "links.testing",
        "--fail-on-pct-threshold",
        "101",
    ];
    assert!(Cli::try_parse_from(args.iter()).is_err());
}

#[test]
fn test_cli_test_requires_file() {
    let args = ["geo_redirect_tester", "test"];
    assert!(Cli::try_parse_from(args.iter()).is_err());
}

#[test]
fn test_cli_monitor_command() {
    let args = [
        "geo_redirect_tester",
        "monitor",
        "--base-url",
        "http://staging.local:8080",
        "--max-concurrency",
        "0",
    ];
    let cli = Cli::try_parse_from(args.iter()).expect("Should parse monitor command");

    match &cli.command {
        CliCommand::Monitor(cmd) => {
            assert_eq!(cmd.base_url, "http://staging.local:8080");
            assert!(!cmd.once);
        }
        CliCommand::Test(_) => panic!("Expected Monitor command"),
    }

    let config = cli.to_config();
    assert_eq!(config.base_url, "http://staging.local:8080");
    // Zero is raised so a run can make progress
    assert_eq!(config.max_concurrency, 1);
}

#[test]
fn test_cli_monitor_default_base_url() {
    let args = ["geo_redirect_tester", "monitor"];
    let cli = Cli::try_parse_from(args.iter()).expect("Should parse monitor command");
    assert_eq!(cli.to_config().base_url, "http://localhost:8080");
}

#[test]
fn test_cli_monitor_rules_path_and_once() {
    let args = [
        "geo_redirect_tester",
        "monitor",
        "--rules-path",
        "/var/www/.htaccess",
        "--log-file",
        "/tmp/monitor.log",
        "--once",
    ];
    let cli = Cli::try_parse_from(args.iter()).expect("Should parse monitor flags");

    match &cli.command {
        CliCommand::Monitor(cmd) => {
            assert!(cmd.once);
            assert_eq!(cmd.log_file, PathBuf::from("/tmp/monitor.log"));
        }
        CliCommand::Test(_) => panic!("Expected Monitor command"),
    }
    assert_eq!(cli.to_config().rules_path, PathBuf::from("/var/www/.htaccess"));
}

#[test]
fn test_cli_monitor_rules_path_default() {
    let args = ["geo_redirect_tester", "monitor"];
    let cli = Cli::try_parse_from(args.iter()).expect("Should parse monitor command");
    assert_eq!(cli.to_config().rules_path, PathBuf::from("../../.htaccess"));
}

#[test]
fn test_cli_requires_subcommand() {
    let args = ["geo_redirect_tester"];
    assert!(Cli::try_parse_from(args.iter()).is_err());
}
