//! Declarative provider schemas and the shared line parser
//!
//! Each provider describes its log quirks as a [`ProviderSchema`]: ordered
//! alias lists for every field and the nested objects to fall back to. The
//! parser in this module is the only code that interprets those tables, so a
//! provider's behavior is fully determined by its data.
//!
//! Lookup order:
//! - metadata fields (timestamp, kind, model, ids): the top-level object
//!   first, then each entry of `metadata_containers`
//! - token counters: each entry of `usage_containers`, then the top-level
//!   object
//!
//! For every field independently the first usable value wins and is never
//! overwritten by a later container.

use crate::error::{Result, TokstatError};
use crate::extract::{JsonNode, extract_int, extract_string, extract_timestamp};
use crate::types::{ISOTimestamp, ModelName, NormalizedRecord, TokenCounts};
use serde_json::{Map, Value};
use std::iter;

/// Ordered key aliases for the five token counters
#[derive(Debug, Clone, Copy)]
pub struct TokenAliases {
    pub input: &'static [&'static str],
    pub output: &'static [&'static str],
    pub cache_read: &'static [&'static str],
    pub cache_create: &'static [&'static str],
    pub total: &'static [&'static str],
}

/// Field alias table for one provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderSchema {
    /// Provider name used in scan results
    pub name: &'static str,
    /// Accepted file extensions without the dot; empty accepts every file
    pub extensions: &'static [&'static str],
    pub timestamp: &'static [&'static str],
    pub kind: &'static [&'static str],
    pub model: &'static [&'static str],
    pub conversation_id: &'static [&'static str],
    pub message_id: &'static [&'static str],
    /// Nested objects searched for metadata after the top level, as key paths
    pub metadata_containers: &'static [&'static [&'static str]],
    /// Nested objects searched for token counters before the top level
    pub usage_containers: &'static [&'static [&'static str]],
    pub tokens: TokenAliases,
}

impl ProviderSchema {
    /// Whether a file name passes this provider's extension filter
    pub fn accepts_file(&self, path: &std::path::Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
    }

    /// Decode one raw line and normalize it.
    ///
    /// Malformed JSON and JSON that is not an object are errors. A valid
    /// object with none of the known fields is not: it yields an empty record.
    pub fn parse_line(&self, line: &[u8]) -> Result<NormalizedRecord> {
        let value: Value = serde_json::from_slice(line)?;
        let Value::Object(raw) = value else {
            return Err(TokstatError::NotAnObject);
        };
        Ok(self.normalize(raw))
    }

    /// Normalize an already-decoded object
    pub fn normalize(&self, raw: Map<String, Value>) -> NormalizedRecord {
        let mut record = {
            let metadata = self.metadata_scopes(&raw);
            NormalizedRecord {
                timestamp: metadata
                    .iter()
                    .find_map(|scope| extract_timestamp(scope, self.timestamp))
                    .map(ISOTimestamp::new),
                kind: first_string(&metadata, self.kind),
                model: ModelName::new(first_string(&metadata, self.model)),
                conversation_id: first_string(&metadata, self.conversation_id),
                message_id: first_string(&metadata, self.message_id),
                ..Default::default()
            }
        };

        let (tokens, total) = self.extract_tokens(&raw);
        record.tokens = tokens;
        record.total_tokens = total;
        record.derive_total();

        record.raw = raw;
        record
    }

    fn metadata_scopes<'a>(&self, raw: &'a Map<String, Value>) -> Vec<&'a Map<String, Value>> {
        iter::once(raw)
            .chain(nested_objects(raw, self.metadata_containers))
            .collect()
    }

    fn extract_tokens(&self, raw: &Map<String, Value>) -> (TokenCounts, u64) {
        let aliases = &self.tokens;
        let mut tokens = TokenCounts::default();
        let mut total = 0;

        for scope in nested_objects(raw, self.usage_containers).chain(iter::once(raw)) {
            fill_counter(&mut tokens.input_tokens, scope, aliases.input);
            fill_counter(&mut tokens.output_tokens, scope, aliases.output);
            fill_counter(&mut tokens.cache_read_tokens, scope, aliases.cache_read);
            fill_counter(&mut tokens.cache_creation_tokens, scope, aliases.cache_create);
            fill_counter(&mut total, scope, aliases.total);
        }

        (tokens, total)
    }
}

fn nested_objects<'a>(
    raw: &'a Map<String, Value>,
    paths: &'static [&'static [&'static str]],
) -> impl Iterator<Item = &'a Map<String, Value>> {
    let root = raw;
    paths.iter().filter_map(move |path| {
        let (first, rest) = path.split_first()?;
        root.get(*first)
            .map(JsonNode::new)
            .map(|node| node.path(rest))
            .and_then(|node| node.as_object())
    })
}

fn first_string(scopes: &[&Map<String, Value>], keys: &[&str]) -> String {
    scopes
        .iter()
        .map(|scope| extract_string(scope, keys))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

// First non-zero wins; negative values count as not reported.
fn fill_counter(slot: &mut u64, scope: &Map<String, Value>, keys: &[&str]) {
    if *slot == 0 {
        *slot = u64::try_from(extract_int(scope, keys)).unwrap_or(0);
    }
}
