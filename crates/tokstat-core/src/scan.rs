//! JSONL directory scanning
//!
//! This module walks one provider's log directory, feeds every line through
//! the provider's [`ProviderSchema`], and tallies what happened in a
//! [`ScanResult`].
//!
//! Counting rules:
//! - every non-blank line read increments `total_entries`
//! - a line that fails to decode increments `parse_errors`
//! - a record older than `since` is dropped and counted nowhere else
//! - everything else is kept in `entries` and counted in `parsed_entries`
//!
//! so `total_entries == parsed_entries + parse_errors + filtered_entries()`
//! holds at every point a result is handed back, including after
//! cancellation.

use crate::cancel::CancellationFlag;
use crate::error::{ScanFailure, TokstatError};
use crate::schema::ProviderSchema;
use crate::types::NormalizedRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, trace, warn};

/// Longest line accepted, in bytes. Longer lines are a per-file error.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Result of a scan: the full result, or the partial one plus what stopped it
pub type ScanOutcome = std::result::Result<ScanResult, ScanFailure>;

/// Per-provider outcome of one scan invocation
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Provider name
    pub provider: String,
    /// Lower time bound applied, if any
    pub since: Option<DateTime<Utc>>,
    /// Upper time bound: the moment the scan started
    pub until: DateTime<Utc>,
    /// Non-blank lines read
    pub total_entries: u64,
    /// Records kept in `entries`
    pub parsed_entries: u64,
    /// Lines that failed to decode, plus per-file read failures
    pub parse_errors: u64,
    /// Kept records in file-then-line order
    #[serde(skip_serializing)]
    pub entries: Vec<NormalizedRecord>,
}

impl ScanResult {
    /// A result with all counters at zero
    pub fn empty(provider: impl Into<String>, since: Option<DateTime<Utc>>) -> Self {
        Self {
            provider: provider.into(),
            since,
            until: Utc::now(),
            total_entries: 0,
            parsed_entries: 0,
            parse_errors: 0,
            entries: Vec::new(),
        }
    }

    /// Records dropped for being older than `since`
    pub fn filtered_entries(&self) -> u64 {
        self.total_entries
            .saturating_sub(self.parsed_entries)
            .saturating_sub(self.parse_errors)
    }
}

/// Pick the directory to scan: the explicit one unless it is absent or empty.
pub fn effective_dir<'a>(dir: Option<&'a Path>, default_dir: &'a Path) -> &'a Path {
    match dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => default_dir,
    }
}

/// Scan every matching file directly inside `dir`.
///
/// A missing directory yields an empty result. Listing failures, file-open
/// failures and cancellation end the scan with a [`ScanFailure`] carrying the
/// counters accumulated so far.
pub async fn scan_directory(
    schema: &ProviderSchema,
    dir: &Path,
    since: Option<DateTime<Utc>>,
    cancel: &CancellationFlag,
) -> ScanOutcome {
    let mut result = ScanResult::empty(schema.name, since);

    let files = match list_log_files(schema, dir).await {
        Ok(Some(files)) => files,
        Ok(None) => {
            debug!("{} log directory not found: {}", schema.name, dir.display());
            return Ok(result);
        }
        Err(e) => return Err(ScanFailure::new(result, e)),
    };

    debug!("Found {} {} log files in {}", files.len(), schema.name, dir.display());

    for file in files {
        if cancel.is_cancelled() {
            return Err(ScanFailure::new(result, TokstatError::Cancelled));
        }

        if let (Some(since), Some(modified)) = (since, file.modified)
            && DateTime::<Utc>::from(modified) < since
        {
            trace!("Skipping untouched file {}", file.path.display());
            continue;
        }

        if let Err(e) = scan_file(schema, &file.path, since, cancel, &mut result).await {
            return Err(ScanFailure::new(result, e));
        }
    }

    debug!(
        provider = schema.name,
        total = result.total_entries,
        parsed = result.parsed_entries,
        errors = result.parse_errors,
        "Scan complete"
    );
    Ok(result)
}

struct LogFile {
    path: PathBuf,
    modified: Option<SystemTime>,
}

/// Regular files accepted by the schema, sorted by path; `None` if `dir` is missing.
async fn list_log_files(
    schema: &ProviderSchema,
    dir: &Path,
) -> crate::Result<Option<Vec<LogFile>>> {
    let read_dir_error = |source: std::io::Error| TokstatError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(read_dir_error(e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let path = entry.path();
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                trace!("Skipping unreadable entry {}: {}", path.display(), e);
                continue;
            }
        };
        if metadata.is_dir() || !schema.accepts_file(&path) {
            continue;
        }
        files.push(LogFile {
            path,
            modified: metadata.modified().ok(),
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(Some(files))
}

async fn scan_file(
    schema: &ProviderSchema,
    path: &Path,
    since: Option<DateTime<Utc>>,
    cancel: &CancellationFlag,
    result: &mut ScanResult,
) -> crate::Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| TokstatError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut line_number = 0u64;

    loop {
        if cancel.is_cancelled() {
            return Err(TokstatError::Cancelled);
        }

        line.clear();
        let limit = MAX_LINE_BYTES as u64 + 1;
        match (&mut reader).take(limit).read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to read {} after line {}: {}", path.display(), line_number, e);
                result.total_entries += 1;
                result.parse_errors += 1;
                break;
            }
        }
        line_number += 1;

        if line.last() != Some(&b'\n') && line.len() > MAX_LINE_BYTES {
            warn!(
                "Line {} in {} exceeds {} bytes, skipping rest of file",
                line_number,
                path.display(),
                MAX_LINE_BYTES
            );
            result.total_entries += 1;
            result.parse_errors += 1;
            break;
        }

        let content = line.trim_ascii();
        if content.is_empty() {
            continue;
        }

        result.total_entries += 1;
        match schema.parse_line(content) {
            Ok(record) => {
                if let (Some(since), Some(ts)) = (since, record.datetime())
                    && *ts < since
                {
                    continue;
                }
                result.entries.push(record);
                result.parsed_entries += 1;
            }
            Err(e) => {
                trace!(
                    "Skipping malformed line {} in {}: {}",
                    line_number,
                    path.display(),
                    e
                );
                result.parse_errors += 1;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TokenAliases;
    use chrono::{Duration, TimeZone};
    use filetime::FileTime;
    use std::io::Write;
    use tempfile::TempDir;

    const SCHEMA: ProviderSchema = ProviderSchema {
        name: "test",
        extensions: &["jsonl"],
        timestamp: &["timestamp"],
        kind: &["type"],
        model: &["model"],
        conversation_id: &["session_id"],
        message_id: &["id"],
        metadata_containers: &[],
        usage_containers: &[&["usage"]],
        tokens: TokenAliases {
            input: &["input_tokens"],
            output: &["output_tokens"],
            cache_read: &["cache_read_tokens"],
            cache_create: &["cache_creation_tokens"],
            total: &["total_tokens"],
        },
    };

    fn line_at(ts: &str, model: &str, input: u64) -> String {
        format!(r#"{{"timestamp":"{ts}","model":"{model}","usage":{{"input_tokens":{input}}}}}"#)
    }

    fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        path
    }

    fn assert_counters_consistent(result: &ScanResult) {
        assert_eq!(
            result.total_entries,
            result.parsed_entries + result.parse_errors + result.filtered_entries()
        );
        assert_eq!(result.parsed_entries, result.entries.len() as u64);
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("never-created");

        let result = scan_directory(&SCHEMA, &missing, None, &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(result.provider, "test");
        assert_eq!(result.total_entries, 0);
        assert_eq!(result.parsed_entries, 0);
        assert_eq!(result.parse_errors, 0);
        assert!(result.entries.is_empty());
    }

    #[tokio::test]
    async fn test_valid_and_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let valid = line_at("2025-01-10T12:01:00Z", "m1", 10);
        write_file(dir.path(), "a.jsonl", &[&valid, "not valid json"]);

        let result = scan_directory(&SCHEMA, dir.path(), None, &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(result.total_entries, 2);
        assert_eq!(result.parsed_entries, 1);
        assert_eq!(result.parse_errors, 1);
        assert_eq!(result.entries[0].model.as_str(), "m1");
        assert_counters_consistent(&result);
    }

    #[tokio::test]
    async fn test_blank_lines_are_not_entries() {
        let dir = TempDir::new().unwrap();
        let valid = line_at("2025-01-10T12:01:00Z", "m1", 10);
        write_file(dir.path(), "a.jsonl", &["", &valid, "   ", "\r"]);

        let result = scan_directory(&SCHEMA, dir.path(), None, &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(result.total_entries, 1);
        assert_eq!(result.parsed_entries, 1);
    }

    #[tokio::test]
    async fn test_since_keeps_only_newer_records() {
        let dir = TempDir::new().unwrap();
        let old1 = line_at("2025-01-01T00:00:00Z", "m", 1);
        let old2 = line_at("2025-01-05T00:00:00Z", "m", 2);
        let new = line_at("2025-01-10T00:00:00Z", "m", 3);
        write_file(dir.path(), "a.jsonl", &[&old1, &old2, &new]);

        let since = Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap();
        let result = scan_directory(&SCHEMA, dir.path(), Some(since), &CancellationFlag::new())
            .await
            .unwrap();

        assert_eq!(result.total_entries, 3);
        assert_eq!(result.parsed_entries, 1);
        assert_eq!(result.parse_errors, 0);
        assert_eq!(result.filtered_entries(), 2);
        assert_eq!(result.entries[0].tokens.input_tokens, 3);
        assert_eq!(result.since, Some(since));
        assert_counters_consistent(&result);
    }

    #[tokio::test]
    async fn test_records_without_timestamp_survive_since() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.jsonl", &[r#"{"model":"m","usage":{"input_tokens":4}}"#]);

        let since = Utc::now() - Duration::days(1);
        let result = scan_directory(&SCHEMA, dir.path(), Some(since), &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(result.parsed_entries, 1);
        assert!(result.entries[0].timestamp.is_none());
    }

    #[tokio::test]
    async fn test_untouched_files_are_skipped_before_opening() {
        let dir = TempDir::new().unwrap();
        let recent = line_at(&Utc::now().to_rfc3339(), "m", 1);
        let stale = write_file(dir.path(), "stale.jsonl", &[&recent, "not valid json"]);

        let two_days_ago = Utc::now() - Duration::days(2);
        filetime::set_file_mtime(&stale, FileTime::from_unix_time(two_days_ago.timestamp(), 0))
            .unwrap();

        let since = Utc::now() - Duration::days(1);
        let result = scan_directory(&SCHEMA, dir.path(), Some(since), &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(result.total_entries, 0);
        assert_eq!(result.parse_errors, 0);
    }

    #[tokio::test]
    async fn test_subdirectories_and_other_extensions_are_skipped() {
        let dir = TempDir::new().unwrap();
        let valid = line_at("2025-01-10T12:01:00Z", "m", 1);
        write_file(dir.path(), "a.jsonl", &[&valid]);
        write_file(dir.path(), "notes.txt", &["not valid json"]);
        let nested = dir.path().join("nested.jsonl");
        std::fs::create_dir(&nested).unwrap();
        write_file(&nested, "b.jsonl", &[&valid]);

        let result = scan_directory(&SCHEMA, dir.path(), None, &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(result.total_entries, 1);
        assert_eq!(result.parsed_entries, 1);
    }

    #[tokio::test]
    async fn test_entries_follow_file_then_line_order() {
        let dir = TempDir::new().unwrap();
        let l1 = line_at("2025-01-10T12:00:00Z", "m", 1);
        let l2 = line_at("2025-01-10T12:00:00Z", "m", 2);
        let l3 = line_at("2025-01-10T12:00:00Z", "m", 3);
        write_file(dir.path(), "b.jsonl", &[&l3]);
        write_file(dir.path(), "a.jsonl", &[&l1, &l2]);

        let result = scan_directory(&SCHEMA, dir.path(), None, &CancellationFlag::new())
            .await
            .unwrap();
        let inputs: Vec<u64> = result.entries.iter().map(|e| e.tokens.input_tokens).collect();
        assert_eq!(inputs, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_oversized_line_fails_only_its_file() {
        let dir = TempDir::new().unwrap();
        let valid = line_at("2025-01-10T12:01:00Z", "m", 1);
        let huge = format!(r#"{{"pad":"{}"}}"#, "x".repeat(MAX_LINE_BYTES + 10));
        write_file(dir.path(), "a.jsonl", &[&valid, &huge, &valid]);
        write_file(dir.path(), "b.jsonl", &[&valid]);

        let result = scan_directory(&SCHEMA, dir.path(), None, &CancellationFlag::new())
            .await
            .unwrap();
        // a.jsonl: one good line, then the oversized line ends the file
        // b.jsonl: one good line
        assert_eq!(result.total_entries, 3);
        assert_eq!(result.parsed_entries, 2);
        assert_eq!(result.parse_errors, 1);
        assert_counters_consistent(&result);
    }

    #[tokio::test]
    async fn test_line_at_the_limit_is_accepted() {
        let dir = TempDir::new().unwrap();
        let prefix = r#"{"pad":""#;
        let suffix = r#""}"#;
        let pad = "x".repeat(MAX_LINE_BYTES - prefix.len() - suffix.len());
        let line = format!("{prefix}{pad}{suffix}");
        assert_eq!(line.len(), MAX_LINE_BYTES);
        write_file(dir.path(), "a.jsonl", &[&line]);

        let result = scan_directory(&SCHEMA, dir.path(), None, &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(result.parsed_entries, 1);
        assert_eq!(result.parse_errors, 0);
    }

    #[tokio::test]
    async fn test_cancelled_scan_returns_consistent_partial_result() {
        let dir = TempDir::new().unwrap();
        let valid = line_at("2025-01-10T12:01:00Z", "m", 1);
        write_file(dir.path(), "a.jsonl", &[&valid, &valid]);

        let cancel = CancellationFlag::new();
        cancel.cancel();

        let failure = scan_directory(&SCHEMA, dir.path(), None, &cancel)
            .await
            .unwrap_err();
        assert!(failure.is_cancelled());
        assert_eq!(failure.result.total_entries, 0);
        assert_counters_consistent(&failure.result);
    }

    #[tokio::test]
    async fn test_cancelled_between_files_keeps_lines_read() {
        let dir = TempDir::new().unwrap();
        let valid = line_at("2025-01-10T12:01:00Z", "m", 1);
        write_file(dir.path(), "a.jsonl", &[&valid, "not valid json", &valid]);
        write_file(dir.path(), "b.jsonl", &[&valid, &valid]);

        // One poll before a.jsonl, one per line, one at end of file; the
        // next poll, before b.jsonl, reports cancellation.
        let cancel = CancellationFlag::tripping_after(5);
        let failure = scan_directory(&SCHEMA, dir.path(), None, &cancel)
            .await
            .unwrap_err();

        assert!(failure.is_cancelled());
        assert_eq!(failure.result.total_entries, 3);
        assert_eq!(failure.result.parsed_entries, 2);
        assert_eq!(failure.result.parse_errors, 1);
        assert_counters_consistent(&failure.result);
    }

    #[tokio::test]
    async fn test_cancelled_between_lines_keeps_lines_read() {
        let dir = TempDir::new().unwrap();
        let old = line_at("2025-01-01T00:00:00Z", "m", 1);
        let new = line_at("2025-01-10T12:01:00Z", "m", 1);
        write_file(dir.path(), "a.jsonl", &[&old, &new, &new, &new]);

        let since = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        let cancel = CancellationFlag::tripping_after(3);
        let failure = scan_directory(&SCHEMA, dir.path(), Some(since), &cancel)
            .await
            .unwrap_err();

        assert!(failure.is_cancelled());
        assert_eq!(failure.result.total_entries, 2);
        assert_eq!(failure.result.parsed_entries, 1);
        assert_eq!(failure.result.filtered_entries(), 1);
        assert_eq!(failure.result.entries.len(), 1);
        assert_counters_consistent(&failure.result);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_path_that_is_a_file_fails_listing() {
        let dir = TempDir::new().unwrap();
        let file = write_file(dir.path(), "a.jsonl", &["{}"]);

        let failure = scan_directory(&SCHEMA, &file, None, &CancellationFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(failure.error, TokstatError::ReadDir { .. }));
        assert!(!failure.is_cancelled());
        assert_eq!(failure.result.total_entries, 0);
    }

    #[test]
    fn test_effective_dir() {
        let default = Path::new("/default");
        assert_eq!(effective_dir(None, default), default);
        assert_eq!(effective_dir(Some(Path::new("")), default), default);
        assert_eq!(effective_dir(Some(Path::new("/x")), default), Path::new("/x"));
    }
}
