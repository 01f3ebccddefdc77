//! Plain-text rendering of results, watch views, and the monitor matrix.
//!
//! Renderers return strings so they can be tested; the binary decides where
//! they go. Watch views use `\r\n` because the terminal is in raw mode.

use std::fmt::Write;

use colored::Colorize;

use crate::evaluate::TestResult;
use crate::filter::Summary;
use crate::matrix::MatrixReport;
use crate::probe::{is_redirect_status, ProbeOutcome};
use crate::watch::{LoopState, View};

const TITLE: &str = "Geo-Redirection Link Tester";
const CONTROLS: &str = "[f] hide fails  [h] hide passes  [r] re-run  [q] quit";

/// One result row: agent, country, url, expected/actual status, result, expected result, verdict.
pub fn format_result_row(result: &TestResult) -> String {
    let case = &result.test_case;
    let verdict = if result.passed {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    let actual = if i32::from(result.observed_status) == case.expected_status {
        result.observed_status.to_string().green()
    } else {
        result.observed_status.to_string().red()
    };
    format!(
        "{:<10} {:<7} {:<40} {:>8} {:>6}  {:<40} {:<40} {}",
        case.agent,
        case.country.cyan(),
        case.url,
        case.expected_status,
        actual,
        result.observed_result,
        case.expected_result.dimmed(),
        verdict
    )
}

fn header_row() -> String {
    format!(
        "{:<10} {:<7} {:<40} {:>8} {:>6}  {:<40} {:<40} {}",
        "Agent", "Country", "URL", "Expected", "Actual", "Result", "Expected Result", "Status"
    )
    .bold()
    .to_string()
}

/// `Summary: P/T tests passed (x.y%)`
pub fn format_summary(summary: &Summary) -> String {
    let line = format!(
        "Summary: {}/{} tests passed ({:.1}%)",
        summary.passed,
        summary.total,
        summary.pass_rate()
    );
    if summary.failed() == 0 {
        line.green().to_string()
    } else {
        line.yellow().to_string()
    }
}

/// Renders a one-shot run.
pub fn render_results(results: &[TestResult], summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", header_row());
    for result in results {
        let _ = writeln!(out, "{}", format_result_row(result));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", format_summary(summary));
    out
}

/// Title, watched files, status, and last error of a live view.
fn view_header<T>(view: &View<T>, watched: &str, settled: String) -> Vec<String> {
    let mut lines = Vec::new();

    let updated = view
        .last_update
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    lines.push(format!("{}  (last run: {updated})", TITLE.bold()));
    lines.push(format!("Watching {watched}"));

    let mut status = match view.state {
        LoopState::Idle => "Idle".to_string(),
        LoopState::Probing => "Running tests...".yellow().to_string(),
        LoopState::Watching => settled,
    };
    if let Some(filter) = view.filter.describe() {
        let _ = write!(status, "  [{}]", filter.magenta());
    }
    lines.push(status);
    if let Some(error) = &view.last_error {
        lines.push(format!("{} {error}", "Last run failed:".red().bold()));
    }
    lines.push(String::new());
    lines
}

fn finish_raw(mut lines: Vec<String>) -> String {
    lines.push(String::new());
    lines.push(CONTROLS.dimmed().to_string());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

/// Renders a watch view for a raw-mode terminal.
pub fn render_watch_view(view: &View, watched: &str) -> String {
    let mut lines = view_header(view, watched, format_summary(&view.summary));

    lines.push(header_row());
    lines.extend(view.results.iter().map(format_result_row));
    if view.results.is_empty() && view.summary.total > 0 {
        lines.push("(all results hidden by filter)".dimmed().to_string());
    }

    finish_raw(lines)
}

fn format_outcome(outcome: &ProbeOutcome) -> String {
    let status = if outcome.status == 0 {
        outcome.status_text.red()
    } else if is_redirect_status(outcome.status) {
        outcome.status_text.yellow()
    } else {
        outcome.status_text.green()
    };
    format!("{status:<24} {}", outcome.result)
}

fn matrix_lines(report: &MatrixReport) -> Vec<String> {
    let mut lines = Vec::new();
    for section in &report.sections {
        lines.push(String::new());
        lines.push(section.title.bold().underline().to_string());
        for row in &section.rows {
            lines.push(format!("  {:<20} {}", row.label, format_outcome(&row.outcome)));
        }
    }
    lines
}

/// Renders the monitor matrix, one block per section.
pub fn render_matrix(report: &MatrixReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  ({})",
        TITLE.bold(),
        report.last_update.format("%Y-%m-%d %H:%M:%S")
    );
    for line in matrix_lines(report) {
        let _ = writeln!(out, "{line}");
    }
    out
}

/// Renders a live monitor view for a raw-mode terminal.
pub fn render_monitor_view(view: &View<MatrixReport>, watched: &str) -> String {
    let summary = &view.summary;
    let answered = format!(
        "Answered: {}/{} probes ({:.1}%)",
        summary.passed,
        summary.total,
        summary.pass_rate()
    );
    let settled = if summary.failed() == 0 {
        answered.green().to_string()
    } else {
        answered.yellow().to_string()
    };

    let mut lines = view_header(view, watched, settled);
    lines.extend(matrix_lines(&view.results));
    finish_raw(lines)
}
