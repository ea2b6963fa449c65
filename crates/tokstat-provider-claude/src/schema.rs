//! Claude Code field aliases
//!
//! Assistant turns nest the model and message id under `message`, with usage
//! in `message.usage`. The two cache counters are reported separately from
//! `input_tokens`.

use tokstat_core::config::LogDirConfig;
use tokstat_core::schema::{ProviderSchema, TokenAliases};

/// Field aliases for Claude Code transcripts
pub const SCHEMA: ProviderSchema = ProviderSchema {
    name: "claude",
    extensions: &["jsonl"],
    timestamp: &["timestamp", "created_at", "createdAt"],
    kind: &["type", "role"],
    model: &["model"],
    conversation_id: &["sessionId", "session_id", "conversation_id", "conversationId"],
    message_id: &["message_id", "messageId", "id"],
    metadata_containers: &[&["message"]],
    usage_containers: &[&["message", "usage"], &["usage"]],
    tokens: TokenAliases {
        input: &["input_tokens", "inputTokens"],
        output: &["output_tokens", "outputTokens"],
        cache_read: &["cache_read_input_tokens", "cacheReadInputTokens"],
        cache_create: &["cache_creation_input_tokens", "cacheCreationInputTokens"],
        total: &["total_tokens", "totalTokens"],
    },
};

/// `$CLAUDE_CONFIG_DIR/logs`, else `~/.claude/logs`
pub const LOG_DIR: LogDirConfig = LogDirConfig {
    env_var: "CLAUDE_CONFIG_DIR",
    env_subdir: "logs",
    home_subdir: &[".claude", "logs"],
};
