//! Cache-first strategies: stored responses preferred, network behind them.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{PolicyContext, write_through};
use crate::fetch::{Network, same_origin};
use crate::request::{Request, Response};
use inkgate_core::Store;

/// Media assets: a cache hit is returned immediately and a refresh fetch is
/// spawned that the caller never waits on. A miss fetches synchronously;
/// a transport failure degrades to a static placeholder.
pub async fn cache_first_media(ctx: &PolicyContext, req: &Request) -> Response {
    match ctx.media.get(&req.cache_key()).await {
        Ok(Some(entry)) => {
            let _refresh = spawn_refresh(req.clone(), ctx.media.clone(), Arc::clone(&ctx.network));
            Response::from_stored(entry)
        }
        lookup => {
            if let Err(err) = lookup {
                tracing::warn!(url = %req.url, %err, "media cache read failed, treating as miss");
            }
            match ctx.network.fetch(req).await {
                Ok(fetched) => {
                    write_through(&ctx.media, req, &fetched).await;
                    fetched.into_response()
                }
                Err(err) => {
                    tracing::debug!(url = %req.url, %err, "media fetch failed");
                    ctx.offline.media_unavailable()
                }
            }
        }
    }
}

/// Detached background refresh after a stale-tolerant cache hit.
///
/// Runs under its own error boundary: a failed refresh is logged and
/// dropped, never surfaced to the request that triggered it. The write
/// races other writers for the same key; last write wins.
pub(crate) fn spawn_refresh(req: Request, media: Store, network: Arc<dyn Network>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match network.fetch(&req).await {
            Ok(fetched) => write_through(&media, &req, &fetched).await,
            Err(err) => {
                tracing::debug!(url = %req.url, %err, "background media refresh failed");
            }
        }
    })
}

/// Everything else same-origin: return the cached copy if one exists,
/// otherwise fetch; only basic (same-origin, 200) responses are cached.
pub async fn cache_first_default(ctx: &PolicyContext, req: &Request) -> Response {
    match ctx.primary.get(&req.cache_key()).await {
        Ok(Some(entry)) => return Response::from_stored(entry),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(url = %req.url, %err, "cache read failed, treating as miss");
        }
    }

    match ctx.network.fetch(req).await {
        Ok(fetched) => {
            if same_origin(&fetched.final_url, &ctx.origin) {
                write_through(&ctx.primary, req, &fetched).await;
            }
            fetched.into_response()
        }
        Err(err) => {
            tracing::debug!(url = %req.url, %err, "fetch failed with no cached copy");
            ctx.offline.unavailable()
        }
    }
}
