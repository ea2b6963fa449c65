//! Aggregation of normalized records into usage summaries
//!
//! Folding is order-independent: totals are plain sums and the per-model
//! breakdown is keyed by model name. Day buckets come back sorted by date so
//! the output is deterministic.
//!
//! # Examples
//!
//! ```
//! use tokstat_core::aggregation::aggregate;
//! use tokstat_core::types::{ModelName, NormalizedRecord, TokenCounts};
//!
//! let record = NormalizedRecord {
//!     model: ModelName::new("gpt-5"),
//!     tokens: TokenCounts::new(100, 50, 0, 0),
//!     total_tokens: 150,
//!     ..Default::default()
//! };
//!
//! let usage = aggregate([&record, &record]);
//! assert_eq!(usage.total_tokens, 300);
//! assert_eq!(usage.models[&ModelName::new("gpt-5")].input_tokens, 200);
//! ```

use crate::types::{DailyDate, ModelName, NormalizedRecord, TokenCounts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-model token totals
///
/// Cache counters are not broken out per model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTokenUsage {
    pub model: ModelName,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl ModelTokenUsage {
    fn add_tokens(&mut self, input: u64, output: u64, total: u64) {
        self.input_tokens = self.input_tokens.saturating_add(input);
        self.output_tokens = self.output_tokens.saturating_add(output);
        self.total_tokens = self.total_tokens.saturating_add(total);
    }
}

/// Running token totals with a per-model breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Component counters
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Sum of record totals
    pub total_tokens: u64,
    /// Breakdown by model; records without a model never appear here
    pub models: BTreeMap<ModelName, ModelTokenUsage>,
}

impl TokenUsage {
    /// Add one record to the totals and, if it names a model, to that model's bucket
    pub fn accumulate(&mut self, record: &NormalizedRecord) {
        self.tokens += record.tokens;
        self.total_tokens = self.total_tokens.saturating_add(record.total_tokens);

        if record.model.is_empty() {
            return;
        }
        self.model_entry(&record.model).add_tokens(
            record.tokens.input_tokens,
            record.tokens.output_tokens,
            record.total_tokens,
        );
    }

    /// Fold another usage into this one, merging model buckets by name
    pub fn merge(&mut self, other: &TokenUsage) {
        self.tokens += other.tokens;
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);

        for (name, usage) in &other.models {
            self.model_entry(name)
                .add_tokens(usage.input_tokens, usage.output_tokens, usage.total_tokens);
        }
    }

    fn model_entry(&mut self, name: &ModelName) -> &mut ModelTokenUsage {
        self.models
            .entry(name.clone())
            .or_insert_with(|| ModelTokenUsage {
                model: name.clone(),
                ..Default::default()
            })
    }

    /// Whether nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.total_tokens == 0 && self.tokens.is_empty() && self.models.is_empty()
    }

    /// Model breakdown, largest total first, ties broken by name
    pub fn models_sorted(&self) -> Vec<&ModelTokenUsage> {
        let mut models: Vec<_> = self.models.values().collect();
        models.sort_by(|a, b| {
            b.total_tokens
                .cmp(&a.total_tokens)
                .then_with(|| a.model.cmp(&b.model))
        });
        models
    }
}

/// Token usage for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// UTC date, rendered as `YYYY-MM-DD`
    pub date: DailyDate,
    #[serde(flatten)]
    pub usage: TokenUsage,
}

/// Fold `records` into a fresh [`TokenUsage`]
pub fn aggregate<'a, I>(records: I) -> TokenUsage
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    records
        .into_iter()
        .fold(TokenUsage::default(), |mut usage, record| {
            usage.accumulate(record);
            usage
        })
}

/// Bucket records by the UTC date of their timestamp.
///
/// Records without a timestamp are left out entirely. Buckets are returned
/// in ascending date order; no timestamped records means an empty vector.
pub fn aggregate_by_day<'a, I>(records: I) -> Vec<DailyUsage>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut days: BTreeMap<DailyDate, TokenUsage> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.daily_date() {
            days.entry(date).or_default().accumulate(record);
        }
    }

    days.into_iter()
        .map(|(date, usage)| DailyUsage { date, usage })
        .collect()
}
