//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, header names, classification strings)
//! - Library configuration and log option types
//! - CLI definitions

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, CliCommand, MonitorArgs, TestArgs};
pub use constants::*;
pub use types::{Config, FailOn, LogFormat, LogLevel};
