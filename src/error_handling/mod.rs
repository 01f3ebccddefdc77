//! Error handling.
//!
//! Errors are split by where they stop the program:
//! - **Load errors**: the test file is unreadable or malformed; fatal for the run
//! - **Watch errors**: a watch target cannot be subscribed; fatal at startup
//! - **Initialization errors**: logger or HTTP client setup failed
//!
//! Per-probe transport failures are not errors at all; see `probe::ProbeOutcome`.

mod types;

// Re-export public API
pub use types::{InitializationError, LoadError, ParseError, WatchError};
