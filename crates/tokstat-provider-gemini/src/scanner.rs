//! Gemini CLI log scanner

use crate::schema::{LOG_DIR, SCHEMA};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokstat_core::cancel::CancellationFlag;
use tokstat_core::error::Result;
use tokstat_core::provider::LogScanner;
use tokstat_core::scan::{ScanOutcome, effective_dir, scan_directory};
use tokstat_core::types::NormalizedRecord;
use tracing::debug;

/// Log scanner for Gemini CLI telemetry
pub struct Scanner {
    log_dir: PathBuf,
}

impl Scanner {
    /// Create a scanner for `~/.gemini/logs` or `$GEMINI_HOME/logs`
    pub fn new() -> Result<Self> {
        let log_dir = LOG_DIR.resolve()?;
        if !log_dir.exists() {
            debug!("Gemini log directory not found: {}", log_dir.display());
        }
        Ok(Self { log_dir })
    }

    /// Create a scanner for an explicit directory
    pub fn with_dir(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }
}

#[async_trait]
impl LogScanner for Scanner {
    fn name(&self) -> &str {
        SCHEMA.name
    }

    fn default_dir(&self) -> &Path {
        &self.log_dir
    }

    fn parse_line(&self, line: &[u8]) -> Result<NormalizedRecord> {
        SCHEMA.parse_line(line)
    }

    async fn scan(
        &self,
        cancel: &CancellationFlag,
        dir: Option<&Path>,
        since: Option<DateTime<Utc>>,
    ) -> ScanOutcome {
        scan_directory(&SCHEMA, effective_dir(dir, &self.log_dir), since, cancel).await
    }
}
