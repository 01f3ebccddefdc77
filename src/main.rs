//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geo_redirect_tester` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Terminal setup for the live views
//! - User-facing output formatting and exit codes
//!
//! All core functionality is implemented in the library crate.

use std::future::Future;
use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, execute, terminal};
use log::warn;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use geo_redirect_tester::app::{
    render_matrix, render_monitor_view, render_results, render_watch_view,
};
use geo_redirect_tester::config::{Cli, CliCommand, TestArgs, EXIT_FATAL};
use geo_redirect_tester::initialization::{init_logger_to_file, init_logger_with};
use geo_redirect_tester::input::{spawn_key_reader, RawModeGuard};
use geo_redirect_tester::{
    evaluate_exit_code, run_link_tests, run_monitor, watch_link_tests, watch_monitor, Command,
    Config, Summary, View, WatchError,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();

    let code = match &cli.command {
        CliCommand::Test(args) if args.watch => {
            init_logger_to_file(
                config.log_level.clone().into(),
                config.log_format.clone(),
                &args.log_file,
            )
            .context("Failed to initialize logger")?;
            let watched = format!(
                "{} and {}",
                config.file.display(),
                config.rules_path.display()
            );
            live(watched, render_watch_view, |commands, views| {
                watch_link_tests(&config, commands, views)
            })
            .await
        }
        CliCommand::Test(args) => {
            init_logger_with(config.log_level.clone().into(), config.log_format.clone())
                .context("Failed to initialize logger")?;
            test_once(&config, args).await
        }
        CliCommand::Monitor(args) if args.once => {
            init_logger_with(config.log_level.clone().into(), config.log_format.clone())
                .context("Failed to initialize logger")?;
            monitor_once(&config).await
        }
        CliCommand::Monitor(args) => {
            init_logger_to_file(
                config.log_level.clone().into(),
                config.log_format.clone(),
                &args.log_file,
            )
            .context("Failed to initialize logger")?;
            let watched = config.rules_path.display().to_string();
            live(watched, render_monitor_view, |commands, views| {
                watch_monitor(&config, commands, views)
            })
            .await
        }
    };
    process::exit(code);
}

async fn test_once(config: &Config, args: &TestArgs) -> i32 {
    match run_link_tests(config).await {
        Ok(report) => {
            print!("{}", render_results(&report.results, &report.summary));
            println!("Completed in {:.1}s", report.elapsed_seconds);
            evaluate_exit_code(&args.fail_on, args.fail_on_pct_threshold, &report.summary)
        }
        Err(e) => {
            eprintln!("geo_redirect_tester error: {:#}", e);
            EXIT_FATAL
        }
    }
}

async fn monitor_once(config: &Config) -> i32 {
    match run_monitor(config).await {
        Ok(report) => {
            print!("{}", render_matrix(&report));
            0
        }
        Err(e) => {
            eprintln!("geo_redirect_tester error: {:#}", e);
            EXIT_FATAL
        }
    }
}

/// Runs a watch loop with keyboard controls, redrawing every published view.
async fn live<T, R, F, Fut>(watched: String, render: R, start: F) -> i32
where
    T: Send + 'static,
    R: Fn(&View<T>, &str) -> String + Send + 'static,
    F: FnOnce(UnboundedReceiver<Command>, UnboundedSender<View<T>>) -> Fut,
    Fut: Future<Output = Result<Summary, WatchError>>,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (view_tx, mut view_rx) = mpsc::unbounded_channel();

    let raw_mode = match RawModeGuard::enable() {
        Ok(guard) => {
            spawn_key_reader(command_tx.clone());
            Some(guard)
        }
        Err(e) => {
            warn!("Keyboard controls unavailable: {e}");
            None
        }
    };

    let ctrl_c_tx = command_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(Command::Quit);
        }
    });
    drop(command_tx);

    let printer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(view) = view_rx.recv().await {
            let _ = execute!(
                stdout,
                terminal::Clear(terminal::ClearType::All),
                cursor::MoveTo(0, 0)
            );
            let _ = write!(stdout, "{}", render(&view, &watched));
            let _ = stdout.flush();
        }
    });

    let outcome = start(command_rx, view_tx).await;
    // The loop dropped its view sender; let the printer drain
    let _ = printer.await;
    drop(raw_mode);

    match outcome {
        Ok(summary) => {
            println!("Last run: {}/{} passed", summary.passed, summary.total);
            0
        }
        Err(e) => {
            eprintln!("geo_redirect_tester error: {:#}", e);
            EXIT_FATAL
        }
    }
}
