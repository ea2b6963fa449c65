//! Core types, log normalization, and aggregation for tokstat
//!
//! This crate provides the provider-independent record shape, the field
//! extraction heuristics and declarative provider schemas used to build it,
//! the JSONL directory scanner, the aggregation engine, and the orchestrator
//! that runs every registered provider scanner.

pub mod aggregation;
pub mod cancel;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod provider;
pub mod scan;
pub mod schema;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use aggregation::{DailyUsage, ModelTokenUsage, TokenUsage, aggregate, aggregate_by_day};
pub use cancel::CancellationFlag;
pub use error::{Result, ScanFailure, TokstatError};
pub use orchestrator::{Orchestrator, ProviderScan};
pub use provider::LogScanner;
pub use scan::{ScanOutcome, ScanResult};
pub use types::{DailyDate, ISOTimestamp, ModelName, NormalizedRecord, TokenCounts};
