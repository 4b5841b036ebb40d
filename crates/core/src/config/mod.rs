//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (INKGATE_*)
//! 2. TOML config file (if INKGATE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::version;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (INKGATE_*)
/// 2. TOML config file (if INKGATE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the application this gateway fronts.
    ///
    /// Requests from any other origin bypass the cache layer entirely.
    /// Set via INKGATE_APP_ORIGIN environment variable.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Path prefix identifying API requests (network-first, JSON fallback).
    ///
    /// Set via INKGATE_API_PREFIX environment variable.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Path to the SQLite cache database.
    ///
    /// Set via INKGATE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Cache generation identifier for this deploy.
    ///
    /// Set via INKGATE_GENERATION environment variable. Bumping it at a
    /// deploy retires every store created under earlier values.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Root-relative asset paths pre-populated into the primary store at
    /// warm-up (the app shell).
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Root-relative path of the offline document served when a navigation
    /// has neither network nor a cached entry. Must appear in `precache`.
    #[serde(default = "default_offline_document")]
    pub offline_document: String,

    /// Message carried by the offline JSON envelope.
    #[serde(default = "default_offline_message")]
    pub offline_message: String,

    /// File extensions routed to the media store (cache-first with
    /// background refresh). Lowercase, no leading dot.
    #[serde(default = "default_media_extensions")]
    pub media_extensions: Vec<String>,

    /// User-Agent string for upstream requests.
    ///
    /// Set via INKGATE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via INKGATE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via INKGATE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_app_origin() -> String {
    "http://localhost:4173".into()
}

fn default_api_prefix() -> String {
    "/api".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./inkgate-cache.sqlite")
}

fn default_generation() -> String {
    version::DEFAULT_GENERATION.into()
}

fn default_precache() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/offline.html",
        "/manifest.webmanifest",
        "/favicon.ico",
        "/assets/index.js",
        "/assets/index.css",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_offline_document() -> String {
    "/offline.html".into()
}

fn default_offline_message() -> String {
    "You are offline. Please check your network connection.".into()
}

fn default_media_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "ico", "mp4", "webm"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_user_agent() -> String {
    "inkgate/0.1".into()
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
            app_origin: default_app_origin(),
            api_prefix: default_api_prefix(),
            db_path: default_db_path(),
            generation: default_generation(),
            precache: default_precache(),
            offline_document: default_offline_document(),
            offline_message: default_offline_message(),
            media_extensions: default_media_extensions(),
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

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `INKGATE_`
    /// 2. TOML file from `INKGATE_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("INKGATE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("INKGATE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
