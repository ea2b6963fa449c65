//! Codex provider for tokstat
//!
//! This crate implements the `LogScanner` trait for OpenAI Codex, reading
//! session rollouts (`event_msg` / `turn_context` records) as well as the
//! older flat request/response log lines.

pub mod scanner;
pub mod schema;

pub use scanner::Scanner;
pub use schema::{LOG_DIR, SCHEMA};
