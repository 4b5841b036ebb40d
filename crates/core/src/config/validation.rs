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

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
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
    /// - `app_origin` is not an absolute http(s) URL
    /// - `api_prefix`, a `precache` path, or `offline_document` is not root-relative
    /// - `offline_document` is absent from the precache manifest
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `generation`, `user_agent`, or a media extension is malformed
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_scheme = self.app_origin.starts_with("http://") || self.app_origin.starts_with("https://");
        if !has_scheme {
            return Err(invalid("app_origin", "must be an absolute http(s) URL"));
        }

        if !self.api_prefix.starts_with('/') {
            return Err(invalid("api_prefix", "must be root-relative (start with '/')"));
        }

        if self.precache.is_empty() {
            return Err(invalid("precache", "manifest must not be empty"));
        }
        for path in &self.precache {
            if !path.starts_with('/') {
                return Err(invalid("precache", "every manifest path must start with '/'"));
            }
        }

        if !self.offline_document.starts_with('/') {
            return Err(invalid("offline_document", "must be root-relative (start with '/')"));
        }
        if !self.precache.contains(&self.offline_document) {
            // The navigation fallback is only servable if warm-up seeds it.
            return Err(invalid("offline_document", "must appear in the precache manifest"));
        }

        if self.generation.is_empty() {
            return Err(invalid("generation", "must not be empty"));
        }

        for ext in &self.media_extensions {
            if ext.is_empty() || ext.starts_with('.') || ext.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(invalid("media_extensions", "extensions must be lowercase without a leading dot"));
            }
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

        let mut seen = std::collections::HashSet::new();
        let duplicates = self.precache.iter().filter(|path| !seen.insert(path.as_str())).count();
        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "precache manifest contains duplicate paths; \
                 each asset is only stored once"
            );
        }

        Ok(())
    }
}
