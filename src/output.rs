//! Output formatting module for tokstat
//!
//! This module provides formatters for displaying usage data in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use tokstat::output::get_formatter;
//! use tokstat::TokenUsage;
//!
//! let usage = TokenUsage::default();
//! let json = get_formatter(true).format_summary(&usage).unwrap();
//! assert!(json.contains("\"totals\""));
//! ```

use prettytable::{Cell, Row, Table, format, row};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tokstat_core::aggregation::{DailyUsage, TokenUsage};
use tokstat_core::error::Result;
use tokstat_core::orchestrator::ProviderScan;
use tokstat_core::types::TokenCounts;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Combined totals with the per-model breakdown
    fn format_summary(&self, usage: &TokenUsage) -> Result<String>;

    /// Day buckets followed by a totals row
    fn format_daily(&self, data: &[DailyUsage], totals: &TokenUsage) -> Result<String>;

    /// Per-provider scan counters
    fn format_providers(&self, scans: &BTreeMap<String, ProviderScan>) -> Result<String>;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    fn new_table(titles: Row) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(titles);
        table
    }

    fn token_cells(tokens: &TokenCounts, total: u64) -> [String; 5] {
        [
            Self::format_number(tokens.input_tokens),
            Self::format_number(tokens.output_tokens),
            Self::format_number(tokens.cache_creation_tokens),
            Self::format_number(tokens.cache_read_tokens),
            Self::format_number(total),
        ]
    }
}

impl OutputFormatter for TableFormatter {
    fn format_summary(&self, usage: &TokenUsage) -> Result<String> {
        let mut table = Self::new_table(row![
            b -> "Model",
            b -> "Input",
            b -> "Output",
            b -> "Total"
        ]);

        for model in usage.models_sorted() {
            table.add_row(row![
                model.model,
                r -> Self::format_number(model.input_tokens),
                r -> Self::format_number(model.output_tokens),
                r -> Self::format_number(model.total_tokens)
            ]);
        }

        table.add_row(Row::new(vec![Cell::new(""); 4]));
        table.add_row(row![
            b -> "TOTAL",
            b -> Self::format_number(usage.tokens.input_tokens),
            b -> Self::format_number(usage.tokens.output_tokens),
            b -> Self::format_number(usage.total_tokens)
        ]);

        let mut output = table.to_string();
        output.push_str(&format!(
            "\nCache create: {}  Cache read: {}\n",
            Self::format_number(usage.tokens.cache_creation_tokens),
            Self::format_number(usage.tokens.cache_read_tokens)
        ));
        Ok(output)
    }

    fn format_daily(&self, data: &[DailyUsage], totals: &TokenUsage) -> Result<String> {
        let mut table = Self::new_table(row![
            b -> "Date",
            b -> "Input",
            b -> "Output",
            b -> "Cache Create",
            b -> "Cache Read",
            b -> "Total",
            b -> "Models"
        ]);

        for day in data {
            let [input, output, cache_create, cache_read, total] =
                Self::token_cells(&day.usage.tokens, day.usage.total_tokens);
            let models = day
                .usage
                .models_sorted()
                .iter()
                .map(|m| m.model.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(row![
                day.date,
                r -> input,
                r -> output,
                r -> cache_create,
                r -> cache_read,
                r -> total,
                models
            ]);
        }

        table.add_row(Row::new(vec![Cell::new(""); 7]));
        let [input, output, cache_create, cache_read, total] =
            Self::token_cells(&totals.tokens, totals.total_tokens);
        table.add_row(row![
            b -> "TOTAL",
            b -> input,
            b -> output,
            b -> cache_create,
            b -> cache_read,
            b -> total,
            ""
        ]);

        Ok(table.to_string())
    }

    fn format_providers(&self, scans: &BTreeMap<String, ProviderScan>) -> Result<String> {
        let mut table = Self::new_table(row![
            b -> "Provider",
            b -> "Lines",
            b -> "Parsed",
            b -> "Errors",
            b -> "Filtered",
            b -> "Status"
        ]);

        for (name, scan) in scans {
            let result = scan.result();
            table.add_row(row![
                name,
                r -> Self::format_number(result.total_entries),
                r -> Self::format_number(result.parsed_entries),
                r -> Self::format_number(result.parse_errors),
                r -> Self::format_number(result.filtered_entries()),
                scan.error().map_or_else(|| "ok".to_string(), |e| format!("failed: {e}"))
            ]);
        }

        Ok(table.to_string())
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    fn usage_json(usage: &TokenUsage) -> Value {
        json!({
            "input_tokens": usage.tokens.input_tokens,
            "output_tokens": usage.tokens.output_tokens,
            "cache_creation_tokens": usage.tokens.cache_creation_tokens,
            "cache_read_tokens": usage.tokens.cache_read_tokens,
            "total_tokens": usage.total_tokens,
            "models": usage.models_sorted(),
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, usage: &TokenUsage) -> Result<String> {
        let output = json!({ "totals": Self::usage_json(usage) });
        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_daily(&self, data: &[DailyUsage], totals: &TokenUsage) -> Result<String> {
        let output = json!({
            "daily": data.iter().map(|day| {
                let mut day_json = Self::usage_json(&day.usage);
                day_json["date"] = json!(day.date.to_string());
                day_json
            }).collect::<Vec<_>>(),
            "totals": Self::usage_json(totals),
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_providers(&self, scans: &BTreeMap<String, ProviderScan>) -> Result<String> {
        let output = json!({
            "providers": scans.iter().map(|(name, scan)| {
                let result = scan.result();
                json!({
                    "provider": name,
                    "since": result.since,
                    "until": result.until,
                    "total_entries": result.total_entries,
                    "parsed_entries": result.parsed_entries,
                    "parse_errors": result.parse_errors,
                    "filtered_entries": result.filtered_entries(),
                    "failed": scan.is_failed(),
                    "error": scan.error(),
                })
            }).collect::<Vec<_>>(),
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }
}

/// Get the formatter for the requested output mode
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
