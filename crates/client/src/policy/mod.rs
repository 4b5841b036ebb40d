//! The four caching strategies.
//!
//! Each policy is a function of `(context, request) -> response`. Whatever
//! the network does, a policy always resolves to a response; the caller
//! never sees an error from this layer.
//!
//! Store writes share one gate: only 200-status responses to GET requests
//! are ever written, and a failed write is logged and swallowed (the
//! response is still returned).

pub mod cache_first;
pub mod network_first;

use std::sync::Arc;

use reqwest::{Method, StatusCode};

pub use cache_first::{cache_first_default, cache_first_media};
pub use network_first::{network_first_json, network_first_navigation};

use crate::classify::Policy;
use crate::fetch::{FetchResponse, Network};
use crate::offline::OfflineProvider;
use crate::request::{Request, Response, header_pairs};
use inkgate_core::{Store, StoredResponse};

/// Everything a policy needs, injected explicitly so tests can substitute
/// in-memory stores and fake networks.
#[derive(Clone)]
pub struct PolicyContext {
    pub primary: Store,
    pub media: Store,
    /// ASCII origin of the application, for "basic" response checks.
    pub origin: String,
    pub network: Arc<dyn Network>,
    pub offline: OfflineProvider,
}

/// Run the policy a request was classified under.
pub async fn execute(ctx: &PolicyContext, policy: Policy, req: &Request) -> Response {
    match policy {
        Policy::NetworkFirstJson => network_first_json(ctx, req).await,
        Policy::CacheFirstMediaRefresh => cache_first_media(ctx, req).await,
        Policy::NetworkFirstNavigation => network_first_navigation(ctx, req).await,
        Policy::CacheFirstDefault => cache_first_default(ctx, req).await,
    }
}

/// Write a fetched response into a store, subject to the write gate.
///
/// Only 200-status GET responses are cached. Write failures (quota,
/// storage unavailable) are logged and otherwise ignored.
pub(crate) async fn write_through(store: &Store, req: &Request, fetched: &FetchResponse) {
    if req.method != Method::GET || fetched.status != StatusCode::OK {
        return;
    }

    let entry = StoredResponse {
        key: req.cache_key(),
        method: req.method.as_str().to_string(),
        url: req.url.as_str().to_string(),
        status: fetched.status.as_u16(),
        headers: header_pairs(&fetched.headers),
        body: fetched.bytes.to_vec(),
        stored_at: chrono::Utc::now().to_rfc3339(),
    };

    if let Err(err) = store.put(&entry).await {
        tracing::warn!(url = %req.url, %err, "cache write-through failed");
    }
}
