//! Codex field aliases
//!
//! Rollout files wrap everything in a `payload` object: `turn_context`
//! records carry the model, `token_count` events carry per-turn usage under
//! `payload.info.last_token_usage`. `total_token_usage` is cumulative for the
//! session and is deliberately absent from the usage containers.

use tokstat_core::config::LogDirConfig;
use tokstat_core::schema::{ProviderSchema, TokenAliases};

pub const SCHEMA: ProviderSchema = ProviderSchema {
    name: "codex",
    extensions: &["jsonl"],
    timestamp: &["timestamp", "ts", "created_at", "createdAt", "time"],
    kind: &["type", "event", "kind"],
    model: &["model", "model_slug", "modelName"],
    conversation_id: &["conversation_id", "conversationId", "session_id", "sessionId"],
    message_id: &["message_id", "messageId", "turn_id", "id"],
    metadata_containers: &[&["payload"], &["payload", "info"], &["event"]],
    usage_containers: &[
        &["payload", "info", "last_token_usage"],
        &["payload", "usage"],
        &["info", "last_token_usage"],
        &["usage"],
        &["tokens"],
    ],
    tokens: TokenAliases {
        input: &["input_tokens", "inputTokens", "prompt_tokens", "promptTokens"],
        output: &[
            "output_tokens",
            "outputTokens",
            "completion_tokens",
            "completionTokens",
        ],
        cache_read: &[
            "cached_input_tokens",
            "cachedInputTokens",
            "cache_read_input_tokens",
            "cache_read_tokens",
        ],
        cache_create: &[
            "cache_creation_input_tokens",
            "cache_creation_tokens",
            "cacheCreationTokens",
        ],
        total: &["total_tokens", "totalTokens"],
    },
};

/// `$CODEX_HOME/sessions`, else `~/.codex/sessions`
pub const LOG_DIR: LogDirConfig = LogDirConfig {
    env_var: "CODEX_HOME",
    env_subdir: "sessions",
    home_subdir: &[".codex", "sessions"],
};
