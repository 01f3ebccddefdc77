//! Result filtering and summary counts.

use crate::config::{FailOn, EXIT_POLICY_VIOLATION};
use crate::evaluate::TestResult;

/// Which results the presentation layer should hide.
///
/// Persists across re-runs; only explicit toggles change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub hide_fails: bool,
    pub hide_passes: bool,
}

impl FilterState {
    pub fn toggle_hide_fails(&mut self) {
        self.hide_fails = !self.hide_fails;
    }

    pub fn toggle_hide_passes(&mut self) {
        self.hide_passes = !self.hide_passes;
    }

    /// Short status for display, `None` when nothing is hidden.
    pub fn describe(&self) -> Option<&'static str> {
        match (self.hide_fails, self.hide_passes) {
            (true, true) => Some("All filtered"),
            (true, false) => Some("Fails hidden"),
            (false, true) => Some("Passes hidden"),
            (false, false) => None,
        }
    }
}

/// Selects the results visible under `filter`, keeping their original order.
pub fn apply_filter(results: &[TestResult], filter: FilterState) -> Vec<&TestResult> {
    results
        .iter()
        .filter(|result| {
            !(filter.hide_fails && !result.passed) && !(filter.hide_passes && result.passed)
        })
        .collect()
}

/// Pass/total counts for one result set (always over the unfiltered results).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_results(results: &[TestResult]) -> Self {
        Self {
            passed: results.iter().filter(|r| r.passed).count(),
            total: results.len(),
        }
    }

    /// Fields are public, so `passed` may exceed `total`; that counts as no failures.
    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.passed)
    }

    /// Percentage of passing results; 0 for an empty set.
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total as f64 * 100.0
    }
}

/// Exit code for a completed run under the `--fail-on` policy.
///
/// Returns 0 when the policy is satisfied and 2 when it is violated. An empty
/// run is never reported here; callers treat it as fatal before evaluating.
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_exit_code(fail_on: &FailOn, pct_threshold: u8, summary: &Summary) -> i32 {
    let violated = match fail_on {
        FailOn::Never => false,
        FailOn::AnyFailure => summary.failed() > 0,
        FailOn::PctGreaterThan => {
            summary.total > 0
                && (summary.failed() as f64 / summary.total as f64) * 100.0
                    > f64::from(pct_threshold)
        }
    };
    if violated {
        EXIT_POLICY_VIOLATION
    } else {
        0
    }
}
