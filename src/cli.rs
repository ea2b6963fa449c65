//! CLI interface for tokstat
//!
//! ```bash
//! # Combined usage across every provider
//! tokstat summary
//!
//! # Daily breakdown for the last week, as JSON
//! tokstat daily --since 7d --json
//!
//! # Scan counters per provider
//! tokstat providers --codex-dir ~/archive/codex
//! ```

use crate::LogDirs;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokstat_core::error::{Result, TokstatError};

/// Token usage statistics across AI command-line tool logs
#[derive(Parser, Debug, Clone)]
#[command(name = "tokstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only count records from this point on (YYYY-MM-DD, or Nd for the last N days)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Restrict the report to one provider
    #[arg(long, short = 'p', global = true)]
    pub provider: Option<String>,

    /// Codex session directory
    #[arg(long, global = true, value_name = "DIR")]
    pub codex_dir: Option<PathBuf>,

    /// Gemini CLI log directory
    #[arg(long, global = true, value_name = "DIR")]
    pub gemini_dir: Option<PathBuf>,

    /// Claude Code log directory
    #[arg(long, global = true, value_name = "DIR")]
    pub claude_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Directory overrides from the command line
    pub fn log_dirs(&self) -> LogDirs {
        LogDirs {
            codex: self.codex_dir.clone(),
            gemini: self.gemini_dir.clone(),
            claude: self.claude_dir.clone(),
        }
    }
}

/// Available reports
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Combined totals with a per-model breakdown (default)
    Summary,
    /// Usage per UTC day
    Daily,
    /// Scan counters and failures per provider
    Providers,
}

/// Parse a `--since` value relative to `now`.
///
/// Accepts a calendar date (`2025-01-10`, midnight UTC) or a day count
/// (`7d`, seven days before `now`).
pub fn parse_since(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| TokstatError::InvalidDate(format!("Invalid date: {value}")));
    }

    if let Some(days) = value.strip_suffix(['d', 'D']) {
        let days = days
            .parse::<u32>()
            .map_err(|_| TokstatError::InvalidDate(format!("Invalid day count in '{value}'")))?;
        return now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| TokstatError::InvalidDate(format!("Day count out of range: {value}")));
    }

    Err(TokstatError::InvalidDate(format!(
        "Invalid date format '{value}', expected YYYY-MM-DD or Nd"
    )))
}
