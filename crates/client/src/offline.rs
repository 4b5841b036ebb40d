//! Synthetic responses for when both network and cache fail.

use reqwest::StatusCode;
use serde::Serialize;

use crate::request::{Request, Response};
use inkgate_core::{AppConfig, Store};
use url::Url;

/// The JSON error envelope returned to API callers with no cache to fall
/// back on. Fixed shape; consumed by the application's data layer.
#[derive(Debug, Clone, Serialize)]
pub struct OfflineEnvelope {
    pub success: bool,
    pub message: String,
}

/// Minimal document served if even the pre-cached offline page is missing.
const BUILTIN_OFFLINE_DOC: &str =
    "<!doctype html><html><head><title>Offline</title></head><body><h1>You are offline</h1></body></html>";

/// Supplies synthetic fallback responses per request class.
#[derive(Debug, Clone)]
pub struct OfflineProvider {
    message: String,
    document_key: String,
}

impl OfflineProvider {
    pub fn new(config: &AppConfig, origin: &Url) -> Self {
        // Key of the pre-cached offline document: a plain GET against the
        // configured path, same identity warm-up stores it under.
        let document_key = origin
            .join(&config.offline_document)
            .map(|url| Request::get(url).cache_key())
            .unwrap_or_default();
        Self { message: config.offline_message.clone(), document_key }
    }

    /// The 503 JSON envelope for classes that expect JSON.
    pub fn json_envelope(&self) -> Response {
        let envelope = OfflineEnvelope { success: false, message: self.message.clone() };
        let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| b"{\"success\":false}".to_vec());
        Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "application/json", body)
    }

    /// The dedicated offline document for failed navigations.
    ///
    /// Reads the pre-cached document from the primary store; never the
    /// request's own key. Falls back to a built-in page if warm-up never
    /// seeded one.
    pub async fn offline_document(&self, primary: &Store) -> Response {
        match primary.get(&self.document_key).await {
            Ok(Some(entry)) => {
                let mut response = Response::from_stored(entry);
                response.source = crate::request::Source::Fallback;
                response
            }
            Ok(None) => Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/html", BUILTIN_OFFLINE_DOC),
            Err(err) => {
                tracing::warn!(%err, "offline document lookup failed");
                Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/html", BUILTIN_OFFLINE_DOC)
            }
        }
    }

    /// Placeholder for media that cannot be fetched or found.
    pub fn media_unavailable(&self) -> Response {
        Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/plain", "media unavailable")
    }

    /// Generic fallback for uncached static resources.
    pub fn unavailable(&self) -> Response {
        Response::synthetic(StatusCode::SERVICE_UNAVAILABLE, "text/plain", "resource unavailable")
    }
}
