//! Watch loop.
//!
//! Drives both live modes: link tests re-run from the test file, and the
//! monitor matrix re-probed against a server. A single coordinator task owns
//! the current report, the filter state,
//! and the loop state. File changes and user commands reach it only as
//! messages, and it handles one message at a time, so two runs never overlap
//! and a filter toggle never races a run.
//!
//! ```text
//!   Idle ──start──▶ Probing ──run complete──▶ Watching
//!                      ▲                          │
//!                      └── file change / rerun ───┘
//! ```
//!
//! Filter toggles re-derive the published view from the existing report
//! without probing.

mod fs;

use std::fmt::Debug;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, error, info};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::error_handling::LoadError;
use crate::evaluate::{run_test_cases, TestResult};
use crate::filter::{apply_filter, FilterState, Summary};
use crate::probe::Prober;
use crate::suite::load_test_cases;

pub use fs::{is_change, subscribe, FileChange};

/// User commands accepted by the watch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleHideFails,
    ToggleHidePasses,
    Rerun,
    Quit,
}

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Probing,
    Watching,
}

/// Snapshot handed to the presentation layer after every run or filter change.
#[derive(Debug, Clone)]
pub struct View<T = Vec<TestResult>> {
    pub state: LoopState,
    /// What is visible under `filter`, in input order
    pub results: T,
    pub filter: FilterState,
    /// Counts over the unfiltered result set
    pub summary: Summary,
    pub last_update: Option<DateTime<Local>>,
    /// Error from the most recent run, if it failed to load
    pub last_error: Option<String>,
}

/// The outcome of one run, as held by the watch loop.
pub trait Report: Clone + Debug + Default + Send + Sync + 'static {
    /// Copy holding only the entries `filter` leaves visible.
    fn filtered(&self, filter: FilterState) -> Self;

    /// Counts over every entry, ignoring any filter.
    fn summary(&self) -> Summary;
}

impl Report for Vec<TestResult> {
    fn filtered(&self, filter: FilterState) -> Self {
        apply_filter(self, filter).into_iter().cloned().collect()
    }

    fn summary(&self) -> Summary {
        Summary::from_results(self)
    }
}

/// Produces a complete report for one run.
pub trait SuiteRunner: Send + Sync {
    type Report: Report;

    fn run(&self) -> impl Future<Output = Result<Self::Report, LoadError>> + Send;
}

/// Loads the test file and probes every case.
#[derive(Debug, Clone)]
pub struct LinkTestRunner {
    file: PathBuf,
    prober: Prober,
    max_concurrency: usize,
}

impl LinkTestRunner {
    pub fn new(file: PathBuf, prober: Prober, max_concurrency: usize) -> Self {
        Self {
            file,
            prober,
            max_concurrency,
        }
    }
}

impl SuiteRunner for LinkTestRunner {
    type Report = Vec<TestResult>;

    async fn run(&self) -> Result<Vec<TestResult>, LoadError> {
        let test_cases = load_test_cases(&self.file)?;
        Ok(run_test_cases(&self.prober, test_cases, self.max_concurrency).await)
    }
}

/// The coordinator. See the module docs.
pub struct WatchLoop<R: SuiteRunner> {
    runner: R,
    debounce: Duration,
    views: UnboundedSender<View<R::Report>>,
    state: LoopState,
    report: R::Report,
    filter: FilterState,
    last_update: Option<DateTime<Local>>,
    last_error: Option<String>,
}

impl<R: SuiteRunner> WatchLoop<R> {
    pub fn new(runner: R, views: UnboundedSender<View<R::Report>>, debounce: Duration) -> Self {
        Self {
            runner,
            debounce,
            views,
            state: LoopState::Idle,
            report: R::Report::default(),
            filter: FilterState::default(),
            last_update: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs until a `Quit` command arrives or the command channel closes.
    ///
    /// Performs the initial run first. A run in progress always completes
    /// before the next message is handled, including `Quit`. Returns the
    /// summary of the last completed run.
    pub async fn run(
        mut self,
        mut changes: UnboundedReceiver<FileChange>,
        mut commands: UnboundedReceiver<Command>,
    ) -> Summary {
        self.rerun("initial run").await;

        let mut changes_open = true;
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Quit) | None => {
                        info!("Quit requested, leaving watch loop");
                        break;
                    }
                    Some(Command::Rerun) => self.rerun("rerun requested").await,
                    Some(Command::ToggleHideFails) => {
                        self.filter.toggle_hide_fails();
                        self.publish();
                    }
                    Some(Command::ToggleHidePasses) => {
                        self.filter.toggle_hide_passes();
                        self.publish();
                    }
                },

                change = changes.recv(), if changes_open => match change {
                    Some(change) => {
                        let paths = coalesce(&mut changes, change, self.debounce).await;
                        let reason = paths
                            .iter()
                            .map(|p| p.display().to_string())
                            .collect::<Vec<_>>()
                            .join(", ");
                        self.rerun(&format!("changed: {reason}")).await;
                    }
                    None => {
                        debug!("File change channel closed");
                        changes_open = false;
                    }
                },
            }
        }

        self.state = LoopState::Idle;
        self.report.summary()
    }

    async fn rerun(&mut self, reason: &str) {
        debug!("{:?} -> Probing ({reason})", self.state);
        self.state = LoopState::Probing;
        self.publish();

        match self.runner.run().await {
            Ok(report) => {
                let summary = report.summary();
                info!("Run complete: {}/{} passed", summary.passed, summary.total);
                self.report = report;
                self.last_error = None;
                self.last_update = Some(Local::now());
            }
            Err(e) => {
                // Keep the previous report visible; the next change may fix the file
                error!("Run failed: {e}");
                self.last_error = Some(e.to_string());
            }
        }

        debug!("Probing -> Watching");
        self.state = LoopState::Watching;
        self.publish();
    }

    fn view(&self) -> View<R::Report> {
        View {
            state: self.state,
            results: self.report.filtered(self.filter),
            filter: self.filter,
            summary: self.report.summary(),
            last_update: self.last_update,
            last_error: self.last_error.clone(),
        }
    }

    fn publish(&self) {
        if self.views.send(self.view()).is_err() {
            debug!("View receiver dropped");
        }
    }
}

/// Waits out the debounce window, then drains every pending change.
///
/// Returns the distinct paths that changed; all of them are served by one run.
async fn coalesce(
    changes: &mut UnboundedReceiver<FileChange>,
    first: FileChange,
    window: Duration,
) -> Vec<PathBuf> {
    tokio::time::sleep(window).await;

    let mut count = 1;
    let mut paths = vec![first.path];
    while let Ok(change) = changes.try_recv() {
        count += 1;
        if !paths.contains(&change.path) {
            paths.push(change.path);
        }
    }
    debug!("Coalesced {count} change events into one run");
    paths
}
