//! tokstat - token usage statistics across AI command-line tool logs
//!
//! This library wires the provider crates into a ready-made
//! [`Orchestrator`] and re-exports the core types, so most callers only need
//! this crate:
//! - Codex session rollouts (`~/.codex/sessions`)
//! - Gemini CLI telemetry (`~/.gemini/logs`)
//! - Claude Code transcripts (`~/.claude/logs`)
//!
//! # Examples
//!
//! ```no_run
//! use tokstat::{CancellationFlag, with_default_providers};
//!
//! #[tokio::main]
//! async fn main() {
//!     let orchestrator = with_default_providers();
//!     let usage = orchestrator
//!         .combined_token_usage(&CancellationFlag::new(), None)
//!         .await;
//!
//!     for model in usage.models_sorted() {
//!         println!("{}: {}", model.model, model.total_tokens);
//!     }
//! }
//! ```

pub mod cli;
pub mod output;

pub use tokstat_core::{
    CancellationFlag, DailyDate, DailyUsage, ISOTimestamp, LogScanner, ModelName,
    ModelTokenUsage, NormalizedRecord, Orchestrator, ProviderScan, Result, ScanFailure,
    ScanOutcome, ScanResult, TokenCounts, TokenUsage, TokstatError, aggregate, aggregate_by_day,
};
pub use tokstat_provider_claude as claude;
pub use tokstat_provider_codex as codex;
pub use tokstat_provider_gemini as gemini;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Explicit log directories; `None` uses the provider's default
#[derive(Debug, Clone, Default)]
pub struct LogDirs {
    pub codex: Option<PathBuf>,
    pub gemini: Option<PathBuf>,
    pub claude: Option<PathBuf>,
}

/// An orchestrator with the Codex, Gemini and Claude scanners registered
/// for their default directories.
///
/// A provider whose default directory cannot be resolved is left out.
pub fn with_default_providers() -> Orchestrator {
    with_providers(&LogDirs::default())
}

/// Like [`with_default_providers`], with per-provider directory overrides
pub fn with_providers(dirs: &LogDirs) -> Orchestrator {
    let orchestrator = Orchestrator::new();
    register_scanner(
        &orchestrator,
        dirs.codex.as_deref(),
        codex::Scanner::new,
        |dir| codex::Scanner::with_dir(dir),
    );
    register_scanner(
        &orchestrator,
        dirs.gemini.as_deref(),
        gemini::Scanner::new,
        |dir| gemini::Scanner::with_dir(dir),
    );
    register_scanner(
        &orchestrator,
        dirs.claude.as_deref(),
        claude::Scanner::new,
        |dir| claude::Scanner::with_dir(dir),
    );
    orchestrator
}

/// Scan every registered provider, or only `provider` when given.
///
/// Individual provider failures stay in the returned map. A cancelled scan
/// is an error, so callers never report a half-finished run as complete.
pub async fn collect_scans(
    orchestrator: &Orchestrator,
    provider: Option<&str>,
    cancel: &CancellationFlag,
    since: Option<DateTime<Utc>>,
) -> Result<BTreeMap<String, ProviderScan>> {
    let scans = match provider {
        Some(name) => {
            let scan = orchestrator.scan_provider(name, cancel, since).await?;
            BTreeMap::from([(name.to_string(), scan)])
        }
        None => orchestrator.scan_all(cancel, since).await,
    };

    if scans.values().any(ProviderScan::is_cancelled) {
        return Err(TokstatError::Cancelled);
    }
    Ok(scans)
}

fn register_scanner<S>(
    orchestrator: &Orchestrator,
    dir: Option<&Path>,
    default: impl FnOnce() -> Result<S>,
    explicit: impl FnOnce(PathBuf) -> S,
) where
    S: LogScanner + 'static,
{
    let scanner = match dir {
        Some(dir) => explicit(dir.to_path_buf()),
        None => match default() {
            Ok(scanner) => scanner,
            Err(e) => {
                warn!("Skipping provider: {}", e);
                return;
            }
        },
    };
    orchestrator.register(scanner.name().to_string(), Arc::new(scanner));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dirs_register_all_providers() {
        let dirs = LogDirs {
            codex: Some(PathBuf::from("/data/codex")),
            gemini: Some(PathBuf::from("/data/gemini")),
            claude: Some(PathBuf::from("/data/claude")),
        };
        let orchestrator = with_providers(&dirs);

        assert_eq!(orchestrator.providers(), vec!["claude", "codex", "gemini"]);
        assert_eq!(
            orchestrator.scanner("gemini").unwrap().default_dir(),
            Path::new("/data/gemini")
        );
    }

    #[tokio::test]
    async fn test_collect_scans_reports_cancellation() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.jsonl"), "{}\n").unwrap();
        let orchestrator = with_providers(&LogDirs {
            codex: Some(dir.path().to_path_buf()),
            gemini: Some(dir.path().join("missing")),
            claude: Some(dir.path().to_path_buf()),
        });

        let scans = collect_scans(&orchestrator, None, &CancellationFlag::new(), None)
            .await
            .unwrap();
        assert_eq!(scans["codex"].result().parsed_entries, 1);

        let cancel = CancellationFlag::new();
        cancel.cancel();
        let err = collect_scans(&orchestrator, None, &cancel, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TokstatError::Cancelled));

        let err = collect_scans(&orchestrator, Some("claude"), &cancel, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TokstatError::Cancelled));
    }

    #[tokio::test]
    async fn test_collect_scans_unknown_provider() {
        let orchestrator = with_providers(&LogDirs {
            codex: Some(PathBuf::from("/data/codex")),
            ..LogDirs::default()
        });
        let err = collect_scans(&orchestrator, Some("amp"), &CancellationFlag::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TokstatError::UnknownProvider(name) if name == "amp"));
    }
}
