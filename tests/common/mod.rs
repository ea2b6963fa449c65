//! Common test utilities and helpers for tokstat tests
//!
//! This module provides a temporary log tree with one directory per
//! provider, plus builders for the JSONL lines each provider writes.

#![allow(dead_code)]

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokstat::LogDirs;

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Temporary `codex/`, `gemini/` and `claude/` log directories
pub struct LogTree {
    root: TempDir,
}

impl LogTree {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        for provider in ["codex", "gemini", "claude"] {
            std::fs::create_dir(root.path().join(provider)).unwrap();
        }
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn dir(&self, provider: &str) -> PathBuf {
        self.root.path().join(provider)
    }

    pub fn log_dirs(&self) -> LogDirs {
        LogDirs {
            codex: Some(self.dir("codex")),
            gemini: Some(self.dir("gemini")),
            claude: Some(self.dir("claude")),
        }
    }

    /// Write `lines` to `<provider>/<file>`, one per line
    pub async fn write(&self, provider: &str, file: &str, lines: &[String]) -> PathBuf {
        let path = self.dir(provider).join(file);
        let mut out = fs::File::create(&path).await.unwrap();
        for line in lines {
            out.write_all(line.as_bytes()).await.unwrap();
            out.write_all(b"\n").await.unwrap();
        }
        out.flush().await.unwrap();
        path
    }
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A Codex `token_count` event
pub fn codex_token_count(ts: DateTime<Utc>, input: u64, output: u64, cached: u64) -> String {
    json!({
        "timestamp": rfc3339(ts),
        "type": "event_msg",
        "payload": {
            "type": "token_count",
            "info": {
                "last_token_usage": {
                    "input_tokens": input,
                    "cached_input_tokens": cached,
                    "output_tokens": output,
                }
            }
        }
    })
    .to_string()
}

/// A Codex line naming its model, as the older flat format writes it
pub fn codex_response(ts: DateTime<Utc>, model: &str, input: u64, output: u64) -> String {
    json!({
        "ts": ts.timestamp_millis(),
        "event": "response",
        "model": model,
        "usage": {"prompt_tokens": input, "completion_tokens": output},
    })
    .to_string()
}

/// A Gemini CLI `api_response` telemetry record
pub fn gemini_api_response(ts: DateTime<Utc>, model: &str, input: u64, output: u64) -> String {
    json!({
        "attributes": {
            "event.name": "gemini_cli.api_response",
            "event.timestamp": rfc3339(ts),
            "session.id": "gemini-session",
            "model": model,
            "input_token_count": input,
            "output_token_count": output,
        }
    })
    .to_string()
}

/// A Claude Code assistant turn
pub fn claude_assistant(
    ts: DateTime<Utc>,
    model: &str,
    input: u64,
    output: u64,
    cache_create: u64,
    cache_read: u64,
) -> String {
    json!({
        "type": "assistant",
        "timestamp": rfc3339(ts),
        "sessionId": "claude-session",
        "message": {
            "id": format!("msg_{}", ts.timestamp()),
            "model": model,
            "usage": {
                "input_tokens": input,
                "output_tokens": output,
                "cache_creation_input_tokens": cache_create,
                "cache_read_input_tokens": cache_read,
            }
        }
    })
    .to_string()
}

/// Sets an environment variable until dropped
pub struct EnvVarGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvVarGuard {
    pub fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        let original = std::env::var(key).ok();
        // Callers hold ENV_MUTEX
        unsafe {
            std::env::set_var(key, value);
        }
        Self { key, original }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }
}
