//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NEU_CACHE_*)
//! 2. TOML config file (if NEU_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NEU_CACHE_*)
/// 2. TOML config file (if NEU_CACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache storage.
    ///
    /// Set via NEU_CACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Version tag naming the current bucket.
    ///
    /// Bump on every deployment; activation purges every other bucket.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Origin the agent is scoped to. Manifest paths resolve against it.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Assets pre-cached at install, in order.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Path prefix of the API namespace. Matching requests are never cached.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Document served to navigations when the network is unreachable.
    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,

    /// Background sync tags with a registered deferred task.
    #[serde(default = "default_sync_tags")]
    pub sync_tags: Vec<String>,

    /// User-Agent string for network requests.
    ///
    /// Set via NEU_CACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via NEU_CACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Transport timeout in milliseconds. The agent adds no deadline of its own.
    ///
    /// Set via NEU_CACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./neu-cache.sqlite")
}

fn default_cache_version() -> String {
    "x-neu-v1".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_static_assets() -> Vec<String> {
    vec!["/".into(), "/index.html".into()]
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_fallback_path() -> String {
    "/index.html".into()
}

fn default_sync_tags() -> Vec<String> {
    vec!["sync-checkins".into()]
}

fn default_user_agent() -> String {
    "neu-cache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_version: default_cache_version(),
            origin: default_origin(),
            static_assets: default_static_assets(),
            api_prefix: default_api_prefix(),
            fallback_path: default_fallback_path(),
            sync_tags: default_sync_tags(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin).map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NEU_CACHE_`
    /// 2. TOML file from `NEU_CACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NEU_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NEU_CACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
