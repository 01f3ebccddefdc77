//! Configuration constants.
//!
//! This module defines the constants used throughout the application: probe
//! timeouts, header names, the classification strings a probe can produce, and
//! default paths.

use std::time::Duration;

// Probing
/// Default per-probe timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Per-probe timeout covering connect, request, and response
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
/// Maximum number of probes in flight during one run
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Header carrying the simulated visitor country that the redirect rules inspect.
pub const COUNTRY_HEADER: &str = "X-Test-Country";

/// User-Agent sent when a test case's agent is `googlebot`.
pub const GOOGLEBOT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Agent label (case-insensitive) that selects [`GOOGLEBOT_USER_AGENT`].
pub const GOOGLEBOT_AGENT: &str = "googlebot";

// Probe result classifications
/// Any response that is not a 301/302 with a `Location` header.
pub const NO_REDIRECT: &str = "No redirect";
/// 200 response on a `wp-admin` path (header-map probes only).
pub const PROTECTED_NO_REDIRECT: &str = "No redirect (protected)";
/// 200 response on a `robots.txt` or `sitemap` path (header-map probes only).
pub const SEO_PROTECTED_NO_REDIRECT: &str = "No redirect (SEO protected)";
/// Transport failure, including timeout.
pub const CONNECTION_FAILED: &str = "Connection failed";
/// The request could not be constructed (bad URL or header value).
pub const REQUEST_FAILED: &str = "Request failed";
/// Status text reported alongside the two failure classifications.
pub const ERROR_STATUS_TEXT: &str = "Error";

// Test definitions
/// Expected status used when the `ExpectedStatus` column is not an integer.
pub const DEFAULT_EXPECTED_STATUS: i32 = 200;
/// Minimum number of columns a data row needs to become a test case.
/// Columns: Agent, Country, URL, ExpectedStatus, ExpectedResult.
pub const MIN_TEST_COLUMNS: usize = 5;

// Watching
/// Change events for watched files arriving within this window trigger one run.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);
/// Redirect rule file watched alongside the test definitions.
pub const DEFAULT_RULES_PATH: &str = "../../.htaccess";
/// Log file used in watch mode so log lines do not tear the redrawn screen.
pub const DEFAULT_WATCH_LOG_FILE: &str = "geo_redirect_tester.log";

// Monitor matrix
/// Server probed by the built-in monitor matrix.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

// Exit codes
/// Fatal error: load/parse failure, no test cases, or watcher setup failure.
pub const EXIT_FATAL: i32 = 1;
/// The `--fail-on` policy was violated.
pub const EXIT_POLICY_VIOLATION: i32 = 2;
