//! Gemini CLI provider for tokstat
//!
//! This crate implements the `LogScanner` trait for the Gemini CLI. Two line
//! shapes are understood: raw API exchanges carrying a `usageMetadata`
//! object, and OpenTelemetry log records whose fields live under
//! `attributes` with dotted keys (`event.name`, `session.id`, ...).

pub mod scanner;
pub mod schema;

pub use scanner::Scanner;
pub use schema::{LOG_DIR, SCHEMA};
