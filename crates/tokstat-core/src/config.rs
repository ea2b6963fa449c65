//! Default log directory resolution
//!
//! Scanners resolve their default directory exactly once, at construction.
//! An environment override takes precedence over the home-relative default.

use crate::error::{Result, TokstatError};
use std::path::PathBuf;
use tracing::debug;

/// Where a provider keeps its logs by default
#[derive(Debug, Clone, Copy)]
pub struct LogDirConfig {
    /// Environment variable naming the provider's home directory
    pub env_var: &'static str,
    /// Log directory below the overridden home
    pub env_subdir: &'static str,
    /// Log directory below the user's home when the variable is unset
    pub home_subdir: &'static [&'static str],
}

impl LogDirConfig {
    /// Resolve the directory from the environment and the user's home.
    ///
    /// An empty or whitespace-only override is ignored. Fails only when the
    /// override is unset and no home directory can be determined.
    pub fn resolve(&self) -> Result<PathBuf> {
        if let Ok(value) = std::env::var(self.env_var) {
            let value = value.trim();
            if !value.is_empty() {
                let dir = PathBuf::from(value).join(self.env_subdir);
                debug!("Using {} override: {}", self.env_var, dir.display());
                return Ok(dir);
            }
        }

        let home = dirs::home_dir()
            .ok_or_else(|| TokstatError::Config("Cannot determine home directory".into()))?;
        Ok(self
            .home_subdir
            .iter()
            .fold(home, |dir, component| dir.join(component)))
    }
}
