//! Field extraction helpers for loosely-typed log lines
//!
//! Providers disagree on almost everything: epoch units, field names, and how
//! deeply usage counters are nested. The helpers here turn a decoded JSON
//! object into typed values without ever panicking on an unexpected shape.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use tokstat_core::extract::{JsonNode, extract_int, extract_string};
//!
//! let value = json!({"usage": {"prompt_tokens": "42"}, "model": "gpt-5"});
//! let root = JsonNode::new(&value);
//!
//! let usage = root.path(&["usage"]).as_object().unwrap();
//! assert_eq!(extract_int(usage, &["input_tokens", "prompt_tokens"]), 42);
//! assert_eq!(extract_string(root.as_object().unwrap(), &["model"]), "gpt-5");
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Number, Value};

/// Epoch values above this are nanoseconds
const NANOS_THRESHOLD: f64 = 1e18;
/// Epoch values above this are microseconds
const MICROS_THRESHOLD: f64 = 1e15;
/// Epoch values above this are milliseconds; anything smaller is seconds
const MILLIS_THRESHOLD: f64 = 1e12;

/// A JSON value of unknown shape, possibly absent
///
/// Every accessor returns an explicit presence indicator instead of
/// panicking when the shape does not match.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonNode<'a>(Option<&'a Value>);

impl<'a> JsonNode<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(Some(value))
    }

    /// A node with nothing behind it
    pub fn missing() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Child under `key`, missing unless this node is an object holding it
    pub fn get(&self, key: &str) -> JsonNode<'a> {
        Self(self.0.and_then(|v| v.as_object()).and_then(|m| m.get(key)))
    }

    /// Follow a sequence of object keys
    pub fn path(&self, keys: &[&str]) -> JsonNode<'a> {
        keys.iter().fold(*self, |node, key| node.get(key))
    }

    pub fn as_object(&self) -> Option<&'a Map<String, Value>> {
        self.0.and_then(Value::as_object)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.0.and_then(Value::as_str)
    }

    /// Integer coercion, see [`coerce_int`]
    pub fn as_integer(&self) -> Option<i64> {
        self.0.and_then(coerce_int)
    }

    /// Timestamp coercion, see [`parse_timestamp`]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        self.0.and_then(parse_timestamp)
    }
}

impl<'a> From<&'a Value> for JsonNode<'a> {
    fn from(value: &'a Value) -> Self {
        Self::new(value)
    }
}

/// Parse a timestamp from a string or numeric JSON value.
///
/// Strings are tried as RFC 3339 (with or without fractional seconds), then as
/// an offset-less ISO date-time taken to be UTC, then as a decimal number.
/// Numbers have their unit inferred by magnitude: above 1e18 nanoseconds,
/// above 1e15 microseconds, above 1e12 milliseconds, otherwise seconds with
/// the fractional part kept as sub-second precision.
///
/// Returns `None` for empty or unparseable strings and for booleans, null,
/// objects and arrays.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => timestamp_from_number(n),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(n) = s.parse::<i64>() {
        return timestamp_from_i64(n);
    }

    s.parse::<f64>().ok().and_then(timestamp_from_f64)
}

fn timestamp_from_number(n: &Number) -> Option<DateTime<Utc>> {
    if let Some(i) = n.as_i64() {
        return timestamp_from_i64(i);
    }
    n.as_f64().and_then(timestamp_from_f64)
}

/// Unit of an untagged epoch value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpochUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl EpochUnit {
    fn infer(magnitude: f64) -> Self {
        if magnitude > NANOS_THRESHOLD {
            Self::Nanos
        } else if magnitude > MICROS_THRESHOLD {
            Self::Micros
        } else if magnitude > MILLIS_THRESHOLD {
            Self::Millis
        } else {
            Self::Seconds
        }
    }

    fn nanos_per_unit(self) -> f64 {
        match self {
            Self::Seconds => 1e9,
            Self::Millis => 1e6,
            Self::Micros => 1e3,
            Self::Nanos => 1.0,
        }
    }

    fn to_datetime(self, n: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::Seconds => DateTime::from_timestamp(n, 0),
            Self::Millis => DateTime::from_timestamp_millis(n),
            Self::Micros => DateTime::from_timestamp_micros(n),
            Self::Nanos => Some(Utc.timestamp_nanos(n)),
        }
    }
}

fn timestamp_from_i64(n: i64) -> Option<DateTime<Utc>> {
    EpochUnit::infer(n as f64).to_datetime(n)
}

fn timestamp_from_f64(f: f64) -> Option<DateTime<Utc>> {
    let whole = truncate_f64(f)?;
    let unit = EpochUnit::infer(f);
    let frac = ((f - f.trunc()) * unit.nanos_per_unit()).round() as i64;
    unit.to_datetime(whole)?
        .checked_add_signed(chrono::Duration::nanoseconds(frac))
}

/// Coerce a JSON value into an integer.
///
/// Integers pass through, floats are truncated toward zero, and strings are
/// parsed as integers or, failing that, as floats and truncated. Numbers too
/// large for `i64` fall back to their float form.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_f64))
        }
        _ => None,
    }
}

fn truncate_f64(f: f64) -> Option<i64> {
    if !f.is_finite() || f >= i64::MAX as f64 || f <= i64::MIN as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

/// First non-empty string found under `keys`, in order; empty if none.
///
/// A key holding a non-string value is skipped, not fatal.
pub fn extract_string<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> &'a str {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// First value under `keys` that coerces to an integer; zero if none.
///
/// A coercion failure on one key does not stop the scan of the remaining
/// keys. A present, coercible zero does.
pub fn extract_int(object: &Map<String, Value>, keys: &[&str]) -> i64 {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(coerce_int)
        .unwrap_or(0)
}

/// First value under `keys` that parses as a timestamp
pub fn extract_timestamp(object: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(parse_timestamp)
}
