//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the client configuration
//! from the configuration file (~/.config/docsense/config.toml) and layers
//! `DOCSENSE_*` environment overrides on top.

use crate::paths::DocsensePaths;
use docsense_core::config::ClientConfig;
use docsense_core::error::{DocsenseError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const ENV_API_URL: &str = "DOCSENSE_API_URL";
pub const ENV_CALLER_ID: &str = "DOCSENSE_CALLER_ID";
pub const ENV_TIMEOUT_SECS: &str = "DOCSENSE_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "DOCSENSE_LOG_LEVEL";

/// Configuration service that loads and caches the client configuration.
///
/// A missing file is not an error; defaults are used. A file that exists but
/// does not parse or validate is reported as `DocsenseError::Config`.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the default config file location.
    ///
    /// # Errors
    ///
    /// Returns `DocsenseError::Config` if the platform config directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(DocsensePaths::config_file()?))
    }

    /// Creates a ConfigService reading an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the client configuration, loading from file if not cached.
    ///
    /// Environment overrides are read from the process environment.
    pub async fn get_config(&self) -> Result<ClientConfig> {
        if let Some(cached) = self.cached() {
            return Ok(cached);
        }

        let mut loaded = self.load_file().await?;
        apply_env_overrides(&mut loaded, |key| std::env::var(key).ok())?;
        loaded.validate()?;

        tracing::debug!(
            "[ConfigService] Loaded config from {} (api_base_url={})",
            self.path.display(),
            loaded.api_base_url
        );

        let mut write_lock = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *write_lock = None;
    }

    fn cached(&self) -> Option<ClientConfig> {
        let read_lock = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        read_lock.clone()
    }

    /// Reads the TOML file; absent file means defaults.
    async fn load_file(&self) -> Result<ClientConfig> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                DocsenseError::config(format!("Invalid config file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "[ConfigService] No config file at {}, using defaults",
                    self.path.display()
                );
                Ok(ClientConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Applies `DOCSENSE_*` overrides to a loaded configuration.
///
/// # Arguments
///
/// * `config` - Configuration to modify in place
/// * `lookup` - Resolves an environment key to its value
///
/// # Errors
///
/// Returns `DocsenseError::Config` if `DOCSENSE_TIMEOUT_SECS` is not a number.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL) {
        config.api_base_url = url;
    }
    if let Some(caller_id) = lookup(ENV_CALLER_ID) {
        // An empty value disables the signed-out fallback.
        let caller_id = caller_id.trim().to_string();
        config.fallback_caller_id = (!caller_id.is_empty()).then_some(caller_id);
    }
    if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = timeout.trim().parse().map_err(|_| {
            DocsenseError::config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECS, timeout))
        })?;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.log_level = level;
    }
    Ok(())
}
