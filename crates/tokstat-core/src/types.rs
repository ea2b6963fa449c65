//! Core domain types for tokstat
//!
//! This module contains the fundamental types used throughout the tokstat library.
//! These types provide strong typing for model names, timestamps, calendar days,
//! token counts, and the provider-independent record every log line is
//! normalized into.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Strongly-typed model name wrapper
///
/// An empty model name means the provider did not report one.
///
/// # Examples
/// ```
/// use tokstat_core::types::ModelName;
///
/// let model = ModelName::new("gpt-5-codex");
/// assert_eq!(model.as_str(), "gpt-5-codex");
/// assert!(ModelName::default().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no model was reported
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO timestamp wrapper for UTC timestamps
///
/// # Examples
/// ```
/// use tokstat_core::types::ISOTimestamp;
/// use chrono::{TimeZone, Utc};
///
/// let dt = Utc.with_ymd_and_hms(2025, 1, 10, 12, 1, 0).unwrap();
/// let timestamp = ISOTimestamp::new(dt);
///
/// let daily = timestamp.to_daily_date();
/// assert_eq!(daily.to_string(), "2025-01-10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Convert to DailyDate using UTC
    pub fn to_daily_date(&self) -> DailyDate {
        DailyDate::new(self.0.date_naive())
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for ISOTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// UTC calendar date used for day buckets
///
/// Ordering on `DailyDate` matches the lexical order of its `YYYY-MM-DD`
/// rendering.
///
/// # Examples
/// ```
/// use tokstat_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let daily = DailyDate::new(date);
/// assert_eq!(daily.to_string(), "2024-01-15");
/// assert_eq!(daily.format("%B %d, %Y"), "January 15, 2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Create from a timestamp using UTC
    pub fn from_timestamp(ts: &ISOTimestamp) -> Self {
        ts.to_daily_date()
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Component token counters reported for one interaction
///
/// Zero means "not reported"; callers never distinguish that from an
/// explicit zero.
///
/// # Examples
/// ```
/// use tokstat_core::types::TokenCounts;
///
/// let tokens = TokenCounts::new(100, 50, 10, 5);
/// assert_eq!(tokens.total(), 165);
///
/// let combined = tokens + TokenCounts::new(50, 25, 5, 2);
/// assert_eq!(combined.input_tokens, 150);
/// ```
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCounts {
    /// Input tokens used
    pub input_tokens: u64,
    /// Output tokens generated
    pub output_tokens: u64,
    /// Cache creation tokens
    pub cache_creation_tokens: u64,
    /// Cache read tokens
    pub cache_read_tokens: u64,
}

impl TokenCounts {
    /// Create new TokenCounts
    pub fn new(
        input_tokens: u64,
        output_tokens: u64,
        cache_creation_tokens: u64,
        cache_read_tokens: u64,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cache_creation_tokens,
            cache_read_tokens,
        }
    }

    /// Sum of the four component counters, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }

    /// Whether every counter is zero
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(other.cache_creation_tokens);
        self.cache_read_tokens = self.cache_read_tokens.saturating_add(other.cache_read_tokens);
    }
}

/// One log line in the provider-independent shape
///
/// Every provider parser produces this record. Missing fields stay empty or
/// zero; `raw` keeps the decoded object for provider-specific consumers and
/// is never consulted again by tokstat itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// When the entry was created, if recoverable from the payload
    pub timestamp: Option<ISOTimestamp>,
    /// Free-text classification such as "request", "response" or "error"
    pub kind: String,
    /// Model identifier
    pub model: ModelName,
    /// Conversation correlation id
    pub conversation_id: String,
    /// Message correlation id
    pub message_id: String,
    /// Component token counters
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Explicit total if the provider reported one, else the component sum
    pub total_tokens: u64,
    /// The decoded source object
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub raw: Map<String, Value>,
}

impl NormalizedRecord {
    /// Timestamp as a plain `DateTime`, if present
    pub fn datetime(&self) -> Option<&DateTime<Utc>> {
        self.timestamp.as_ref().map(ISOTimestamp::inner)
    }

    /// UTC calendar day of the record, if it carries a timestamp
    pub fn daily_date(&self) -> Option<DailyDate> {
        self.timestamp.as_ref().map(ISOTimestamp::to_daily_date)
    }

    /// Fill `total_tokens` from the component counters when no total was reported
    pub fn derive_total(&mut self) {
        if self.total_tokens == 0 {
            self.total_tokens = self.tokens.total();
        }
    }
}
