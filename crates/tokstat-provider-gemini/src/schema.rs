//! Gemini CLI field aliases
//!
//! API exchanges report usage in `usageMetadata` (`promptTokenCount`,
//! `candidatesTokenCount`, ...). Telemetry records flatten the same counters
//! into `attributes` with snake_case names.

use tokstat_core::config::LogDirConfig;
use tokstat_core::schema::{ProviderSchema, TokenAliases};

/// Field aliases for Gemini CLI logs
///
/// Telemetry files are written with a variety of extensions, so every regular
/// file in the log directory is read.
pub const SCHEMA: ProviderSchema = ProviderSchema {
    name: "gemini",
    extensions: &[],
    timestamp: &[
        "timestamp",
        "event.timestamp",
        "time",
        "createTime",
        "observedTimestamp",
    ],
    kind: &["type", "event.name", "event", "kind"],
    model: &["model", "modelVersion", "model_name", "modelName"],
    conversation_id: &["session_id", "session.id", "sessionId", "conversation_id"],
    message_id: &["prompt_id", "promptId", "responseId", "message_id", "id"],
    metadata_containers: &[&["request"], &["response"], &["attributes"]],
    usage_containers: &[
        &["usageMetadata"],
        &["response", "usageMetadata"],
        &["attributes"],
        &["usage"],
        &["tokens"],
    ],
    tokens: TokenAliases {
        input: &["promptTokenCount", "input_token_count", "input_tokens", "input"],
        output: &[
            "candidatesTokenCount",
            "output_token_count",
            "output_tokens",
            "output",
        ],
        cache_read: &[
            "cachedContentTokenCount",
            "cached_content_token_count",
            "cache_read_tokens",
            "cached",
        ],
        cache_create: &["cache_creation_tokens"],
        total: &["totalTokenCount", "total_token_count", "total_tokens", "total"],
    },
};

/// `$GEMINI_HOME/logs`, else `~/.gemini/logs`
pub const LOG_DIR: LogDirConfig = LogDirConfig {
    env_var: "GEMINI_HOME",
    env_subdir: "logs",
    home_subdir: &[".gemini", "logs"],
};
