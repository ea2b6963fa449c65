//! Error types for tokstat
//!
//! This module defines the error types used throughout the tokstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Line-level decode failures are represented here too, but a scan never
//! returns them: they are counted in `ScanResult::parse_errors` instead.
//!
//! # Example
//!
//! ```
//! use tokstat_core::error::{TokstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to TokstatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::scan::ScanResult;

/// Main error type for tokstat operations
#[derive(Error, Debug)]
pub enum TokstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The line decoded to valid JSON that is not an object
    #[error("JSON line is not an object")]
    NotAnObject,

    /// Listing a log directory failed
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        /// The directory being listed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Opening a log file failed
    #[error("Failed to open {path}: {source}")]
    OpenFile {
        /// The file being opened
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The scan was cancelled before it completed
    #[error("Scan cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// No scanner registered under the given name
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

/// Convenience type alias for Results in tokstat
pub type Result<T> = std::result::Result<T, TokstatError>;

/// A scan that stopped early, together with everything it had gathered.
///
/// Directory-listing failures, file-open failures and cancellation all end a
/// scan; the counters in `result` always describe exactly the lines read
/// before the failure.
#[derive(Error, Debug)]
#[error("{} scan failed: {error}", .result.provider)]
pub struct ScanFailure {
    /// Partial result accumulated before the failure
    pub result: ScanResult,
    /// What stopped the scan
    #[source]
    pub error: TokstatError,
}

impl ScanFailure {
    pub fn new(result: ScanResult, error: TokstatError) -> Self {
        Self { result, error }
    }

    /// Whether the scan stopped because it was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, TokstatError::Cancelled)
    }
}
