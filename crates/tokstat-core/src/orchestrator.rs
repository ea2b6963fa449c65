//! Multi-provider scan orchestration
//!
//! The [`Orchestrator`] owns a registry of named [`LogScanner`]s and fans a
//! time-bounded scan out across all of them. Scans are best-effort: a
//! provider whose scan fails still gets an entry in the result map, tagged
//! as failed, and the other providers are unaffected.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokstat_core::{CancellationFlag, Orchestrator};
//! # use tokstat_core::LogScanner;
//!
//! # async fn example(codex: Arc<dyn LogScanner>) {
//! let orchestrator = Orchestrator::new();
//! orchestrator.register("codex", codex);
//!
//! let usage = orchestrator
//!     .combined_token_usage(&CancellationFlag::new(), None)
//!     .await;
//! println!("{} tokens", usage.total_tokens);
//! # }
//! ```

use crate::aggregation::{TokenUsage, aggregate};
use crate::cancel::CancellationFlag;
use crate::error::{Result, TokstatError};
use crate::provider::LogScanner;
use crate::scan::ScanResult;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Outcome of one provider's scan inside [`Orchestrator::scan_all`]
#[derive(Debug, Clone)]
pub enum ProviderScan {
    /// The scan ran to completion
    Scanned(ScanResult),
    /// The scan failed; `result` has `parse_errors` of one and no entries
    Failed {
        result: ScanResult,
        error: String,
        /// The failure was a cancellation rather than an I/O problem
        cancelled: bool,
    },
}

impl ProviderScan {
    pub fn result(&self) -> &ScanResult {
        match self {
            Self::Scanned(result) | Self::Failed { result, .. } => result,
        }
    }

    pub fn into_result(self) -> ScanResult {
        match self {
            Self::Scanned(result) | Self::Failed { result, .. } => result,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Whether the scan stopped because it was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Failed { cancelled: true, .. })
    }

    /// Failure message, if the scan failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Scanned(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// Registry of provider scanners
///
/// Lookups and listings take a shared lock; registration takes an exclusive
/// one. Scans run on a snapshot of the registry, so the lock is never held
/// across an await.
#[derive(Default)]
pub struct Orchestrator {
    scanners: RwLock<HashMap<String, Arc<dyn LogScanner>>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scanner` under `name`, replacing any previous registration
    pub fn register(&self, name: impl Into<String>, scanner: Arc<dyn LogScanner>) {
        let name = name.into();
        debug!("Registering {} scanner ({})", name, scanner.default_dir().display());
        self.scanners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, scanner);
    }

    /// Registered provider names, sorted
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scanners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// The scanner registered under `name`
    pub fn scanner(&self, name: &str) -> Option<Arc<dyn LogScanner>> {
        self.scanners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn LogScanner>)> {
        self.scanners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, scanner)| (name.clone(), Arc::clone(scanner)))
            .collect()
    }

    /// Scan every registered provider's default directory concurrently.
    ///
    /// Never fails: every registered provider appears in the returned map.
    pub async fn scan_all(
        &self,
        cancel: &CancellationFlag,
        since: Option<DateTime<Utc>>,
    ) -> BTreeMap<String, ProviderScan> {
        let scans = self.snapshot().into_iter().map(|(name, scanner)| async move {
            let outcome = run_scan(&name, scanner.as_ref(), cancel, since).await;
            (name, outcome)
        });

        join_all(scans).await.into_iter().collect()
    }

    /// Scan a single registered provider
    pub async fn scan_provider(
        &self,
        name: &str,
        cancel: &CancellationFlag,
        since: Option<DateTime<Utc>>,
    ) -> Result<ProviderScan> {
        let scanner = self
            .scanner(name)
            .ok_or_else(|| TokstatError::UnknownProvider(name.to_string()))?;
        Ok(run_scan(name, scanner.as_ref(), cancel, since).await)
    }

    /// Per-provider token usage for one scan
    pub async fn usage_by_provider(
        &self,
        cancel: &CancellationFlag,
        since: Option<DateTime<Utc>>,
    ) -> BTreeMap<String, TokenUsage> {
        self.scan_all(cancel, since)
            .await
            .into_iter()
            .map(|(name, scan)| (name, aggregate(&scan.result().entries)))
            .collect()
    }

    /// Combined token usage across every provider.
    ///
    /// Model buckets with the same name are merged across providers.
    pub async fn combined_token_usage(
        &self,
        cancel: &CancellationFlag,
        since: Option<DateTime<Utc>>,
    ) -> TokenUsage {
        let scans = self.scan_all(cancel, since).await;
        aggregate(scans.values().flat_map(|scan| scan.result().entries.iter()))
    }
}

async fn run_scan(
    name: &str,
    scanner: &dyn LogScanner,
    cancel: &CancellationFlag,
    since: Option<DateTime<Utc>>,
) -> ProviderScan {
    match scanner.scan(cancel, None, since).await {
        Ok(result) => ProviderScan::Scanned(result),
        Err(failure) => {
            let cancelled = failure.is_cancelled();
            if cancelled {
                debug!("Scan of {} cancelled", name);
            } else {
                warn!("Scan of {} failed: {}", name, failure.error);
            }
            let mut result = ScanResult::empty(failure.result.provider, since);
            result.parse_errors = 1;
            ProviderScan::Failed {
                result,
                error: failure.error.to_string(),
                cancelled,
            }
        }
    }
}
