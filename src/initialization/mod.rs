//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - The probe HTTP client (redirects disabled, bounded timeout)
//! - The logger (stderr or file)
//! - The concurrency semaphore for a run

mod client;
mod logger;

use std::sync::Arc;

use tokio::sync::Semaphore;

// Re-export public API
pub use client::init_probe_client;
pub use logger::{init_logger_to_file, init_logger_with};

/// Initializes a semaphore for controlling concurrency.
///
/// Creates a new semaphore with the specified permit count, used to limit the
/// number of probes in flight during one run. A count of zero is raised to one
/// so a run can always make progress.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count.max(1)))
}
