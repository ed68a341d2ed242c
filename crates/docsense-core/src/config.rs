//! Client configuration model.

use crate::error::{DocsenseError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CALLER_HEADER: &str = "X-User-Id";
/// Development user accepted by the backend's dev auth middleware.
pub const DEFAULT_FALLBACK_CALLER_ID: &str = "00000000-0000-0000-0000-000000000001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_QUERY_TOP_K: u32 = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings for talking to the DocSense backend.
///
/// Every field has a default so a partial `config.toml` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL the `/api/documents` routes hang off
    pub api_base_url: String,
    /// Header carrying the caller identity on every request
    pub caller_header: String,
    /// Caller id used while nobody is signed in (`None` disables requests)
    pub fallback_caller_id: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// `top_k` sent with every query
    pub query_top_k: u32,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            caller_header: DEFAULT_CALLER_HEADER.to_string(),
            fallback_caller_id: Some(DEFAULT_FALLBACK_CALLER_ID.to_string()),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            query_top_k: DEFAULT_QUERY_TOP_K,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Checks the values a hand-edited file or environment could break.
    ///
    /// # Errors
    ///
    /// Returns `DocsenseError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(DocsenseError::config(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        if self.caller_header.trim().is_empty() {
            return Err(DocsenseError::config("caller_header must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(DocsenseError::config("request_timeout_secs must be positive"));
        }
        if self.query_top_k == 0 {
            return Err(DocsenseError::config("query_top_k must be positive"));
        }
        Ok(())
    }
}
