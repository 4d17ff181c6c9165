//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_version` is empty
    /// - `origin` is not an http(s) URL
    /// - `api_prefix` or `fallback_path` is not an absolute path
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_version.trim().is_empty() {
            return Err(invalid("cache_version", "must not be empty"));
        }

        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", "scheme must be http or https"));
        }

        if !self.api_prefix.starts_with('/') || self.api_prefix.len() < 2 {
            return Err(invalid("api_prefix", "must be an absolute path below the root"));
        }

        if !self.fallback_path.starts_with('/') {
            return Err(invalid("fallback_path", "must be an absolute path"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if !self.static_assets.iter().any(|a| a == &self.fallback_path) {
            tracing::warn!(
                fallback_path = %self.fallback_path,
                "fallback document is not in static_assets; offline navigation will fail until it is cached"
            );
        }

        Ok(())
    }
}
