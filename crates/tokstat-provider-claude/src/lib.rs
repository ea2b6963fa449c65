//! Claude Code provider for tokstat
//!
//! This crate implements the `LogScanner` trait for Claude Code transcripts,
//! where assistant turns carry the model and usage inside `message`.

pub mod scanner;
pub mod schema;

pub use scanner::Scanner;
pub use schema::{LOG_DIR, SCHEMA};
