//! Unified path management for DocSense configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/docsense/          # Config directory (platform config dir)
//! ├── config.toml              # Client configuration
//! └── logs/                    # Client logs
//!     └── docsense.log.YYYY-MM-DD
//! ```
//!
//! Chat and message state is never written here; it lives in memory only.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for docsense_core::DocsenseError {
    fn from(err: PathError) -> Self {
        docsense_core::DocsenseError::config(err.to_string())
    }
}

const APP_DIR: &str = "docsense";

/// Unified path management for DocSense.
pub struct DocsensePaths;

impl DocsensePaths {
    /// Returns the DocSense configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/docsense/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory holding rolling log files.
    pub fn log_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
