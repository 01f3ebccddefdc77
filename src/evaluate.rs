//! Outcome evaluation and test runs.
//!
//! The status code is the primary signal. The result text is only checked
//! when the expectation names a redirect target and a 301/302 was actually
//! observed, so a matching status with an unexpected classification can still
//! pass.

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, warn};

use crate::config::NO_REDIRECT;
use crate::initialization::init_semaphore;
use crate::probe::{is_redirect_status, ProbeOutcome, Prober};
use crate::suite::TestCase;

/// Outcome of one test case in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub test_case: TestCase,
    pub observed_status: u16,
    pub observed_result: String,
    pub passed: bool,
}

impl TestResult {
    /// Evaluates `outcome` against `test_case`.
    pub fn new(test_case: TestCase, outcome: ProbeOutcome) -> Self {
        let passed = evaluate(&test_case, &outcome);
        Self {
            test_case,
            observed_status: outcome.status,
            observed_result: outcome.result,
            passed,
        }
    }
}

/// Decides whether an observed outcome satisfies a test case.
pub fn evaluate(test_case: &TestCase, outcome: &ProbeOutcome) -> bool {
    let status_matches = i32::from(outcome.status) == test_case.expected_status;
    if !status_matches {
        return false;
    }

    if test_case.expected_result == NO_REDIRECT {
        // Never true here: a "No redirect" expectation passes on status alone.
        if outcome.result != NO_REDIRECT && !status_matches {
            return false;
        }
    } else if !outcome.result.contains(&test_case.expected_result)
        && is_redirect_status(outcome.status)
    {
        return false;
    }

    true
}

/// Runs every test case and returns one result per case, in input order.
///
/// Probes run concurrently, at most `max_concurrency` at a time; each has its
/// own timeout, so a slow probe only delays the end of the run.
pub async fn run_test_cases(
    prober: &Prober,
    test_cases: Vec<TestCase>,
    max_concurrency: usize,
) -> Vec<TestResult> {
    let semaphore = init_semaphore(max_concurrency);
    let mut tasks = FuturesUnordered::new();

    for (index, test_case) in test_cases.iter().cloned().enumerate() {
        let prober = prober.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.push(tokio::spawn(async move {
            // The semaphore is never closed
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = prober
                .probe(
                    &test_case.url,
                    &test_case.country_header(),
                    test_case.user_agent(),
                )
                .await;
            (index, outcome)
        }));
    }

    let mut outcomes: Vec<Option<ProbeOutcome>> = vec![None; test_cases.len()];
    while let Some(joined) = tasks.next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => warn!("Probe task failed: {e}"),
        }
    }

    let results: Vec<TestResult> = test_cases
        .into_iter()
        .zip(outcomes)
        .map(|(test_case, outcome)| {
            TestResult::new(test_case, outcome.unwrap_or_else(ProbeOutcome::request_failed))
        })
        .collect();
    debug!(
        "Evaluated {} test cases, {} passed",
        results.len(),
        results.iter().filter(|r| r.passed).count()
    );
    results
}
