//! Provider trait for log scanners
//!
//! This module defines the `LogScanner` trait that all provider crates
//! implement. It gives the orchestrator a uniform, object-safe interface for
//! parsing single lines and scanning a whole log directory.

use crate::cancel::CancellationFlag;
use crate::error::Result;
use crate::scan::ScanOutcome;
use crate::types::NormalizedRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Trait for provider-specific log scanners.
///
/// Each provider crate (Codex, Gemini, Claude) implements this trait so the
/// orchestrator can fan a scan out over any set of providers.
#[async_trait]
pub trait LogScanner: Send + Sync {
    /// Provider name reported in scan results
    fn name(&self) -> &str;

    /// Directory scanned when the caller does not supply one.
    ///
    /// Resolved once when the scanner is constructed.
    fn default_dir(&self) -> &Path;

    /// Normalize one raw log line
    fn parse_line(&self, line: &[u8]) -> Result<NormalizedRecord>;

    /// Scan `dir` (or the default directory when `None` or empty), keeping
    /// records at or after `since`.
    async fn scan(
        &self,
        cancel: &CancellationFlag,
        dir: Option<&Path>,
        since: Option<DateTime<Utc>>,
    ) -> ScanOutcome;
}
