//! Error type definitions.
//!
//! Transport failures during probing are deliberately absent: they are folded
//! into a classified `ProbeOutcome` and never propagate as errors.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors loading a test definition file.
///
/// Both variants are fatal for the whole load: no partial list of test cases
/// is ever returned.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("Failed to read test file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed CSV (bad quoting, inconsistent field count).
    #[error("Failed to parse test file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Malformed test definition content.
///
/// Quoting follows RFC 4180: a `"` may only open a field (after optional
/// leading blanks), appear doubled inside a quoted field, or close a field
/// right before a delimiter or line end.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Structural CSV error, e.g. a row whose field count differs from the first row.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("bare \" in non-quoted field on line {line}")]
    BareQuote { line: u64 },

    #[error("extraneous \" after quoted field on line {line}")]
    ExtraneousQuote { line: u64 },

    #[error("quoted field starting on line {line} is never closed")]
    UnterminatedQuote { line: u64 },
}

/// Errors starting or running the watch loop.
#[derive(Error, Debug)]
pub enum WatchError {
    /// A watched path could not be subscribed to.
    #[error("Failed to watch {}: {source}", path.display())]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The file watcher itself could not be created.
    #[error("Failed to create file watcher: {0}")]
    Watcher(#[source] notify::Error),

    /// The test file could not be loaded when watching started.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The test file holds no test cases.
    #[error("No test cases in {}", path.display())]
    Empty { path: PathBuf },

    /// The HTTP client for probing could not be built.
    #[error(transparent)]
    Initialization(#[from] InitializationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_io_message_names_path() {
        let err = LoadError::Io {
            path: PathBuf::from("/nonexistent/links.testing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/links.testing"), "{msg}");
        assert!(msg.contains("Failed to read"), "{msg}");
    }

    #[test]
    fn test_parse_error_message_names_line() {
        let err = LoadError::Parse {
            path: PathBuf::from("links.testing"),
            source: ParseError::UnterminatedQuote { line: 3 },
        };
        let msg = err.to_string();
        assert!(msg.contains("links.testing"), "{msg}");
        assert!(msg.contains("line 3"), "{msg}");
    }
}
