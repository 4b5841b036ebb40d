//! Network-first strategies: live data preferred, cache behind it.

use super::{PolicyContext, write_through};
use crate::request::{Request, Response};

/// API traffic: try the network, fall back to the cached payload, then to
/// the 503 JSON envelope. The caller never observes an error.
pub async fn network_first_json(ctx: &PolicyContext, req: &Request) -> Response {
    match ctx.network.fetch(req).await {
        Ok(fetched) => {
            write_through(&ctx.primary, req, &fetched).await;
            fetched.into_response()
        }
        Err(err) => {
            tracing::debug!(url = %req.url, %err, "api fetch failed, trying cache");
            match ctx.primary.get(&req.cache_key()).await {
                Ok(Some(entry)) => Response::from_stored(entry),
                Ok(None) => ctx.offline.json_envelope(),
                Err(store_err) => {
                    tracing::warn!(url = %req.url, %store_err, "cache read failed");
                    ctx.offline.json_envelope()
                }
            }
        }
    }
}

/// Document loads: try the network, fall back to the cached page for this
/// exact URL, then to the dedicated offline document (never the request's
/// own key).
pub async fn network_first_navigation(ctx: &PolicyContext, req: &Request) -> Response {
    match ctx.network.fetch(req).await {
        Ok(fetched) => {
            write_through(&ctx.primary, req, &fetched).await;
            fetched.into_response()
        }
        Err(err) => {
            tracing::debug!(url = %req.url, %err, "navigation fetch failed, trying cache");
            match ctx.primary.get(&req.cache_key()).await {
                Ok(Some(entry)) => Response::from_stored(entry),
                Ok(None) => ctx.offline.offline_document(&ctx.primary).await,
                Err(store_err) => {
                    tracing::warn!(url = %req.url, %store_err, "cache read failed");
                    ctx.offline.offline_document(&ctx.primary).await
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::testutil::{FakeNetwork, context, get};
    use crate::request::{Request, Source, stored_from};
    use reqwest::StatusCode;
    use std::sync::Arc;
    use url::Url;

    #[tokio::test]
    async fn test_success_returns_live_and_writes_through() {
        let ctx = context(Arc::new(FakeNetwork::ok(b"{\"posts\":[]}"))).await;
        let req = get("/api/posts?page=1");

        let response = network_first_json(&ctx, &req).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.source, Source::Network);
        assert!(ctx.primary.contains(&req.cache_key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_failure_serves_cached_entry() {
        let seeded = context(Arc::new(FakeNetwork::ok(b"{\"posts\":[1]}"))).await;
        let req = get("/api/posts?page=1");
        network_first_json(&seeded, &req).await;

        // Same stores, network now down.
        let ctx = PolicyContext { network: Arc::new(FakeNetwork::offline()), ..seeded };
        let response = network_first_json(&ctx, &req).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.source, Source::Cache);
        assert_eq!(&response.body[..], b"{\"posts\":[1]}");
    }

    #[tokio::test]
    async fn test_failure_without_cache_returns_envelope() {
        let ctx = context(Arc::new(FakeNetwork::offline())).await;
        let response = network_first_json(&ctx, &get("/api/thoughts/abc")).await;

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(value["success"], false);
    }

    #[tokio::test]
    async fn test_non_200_returned_uncached() {
        let ctx = context(Arc::new(FakeNetwork::status(StatusCode::NOT_FOUND, b"gone"))).await;
        let req = get("/api/posts/999");

        let response = network_first_json(&ctx, &req).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(!ctx.primary.contains(&req.cache_key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_mutating_method_never_cached() {
        let ctx = context(Arc::new(FakeNetwork::ok(b"{\"id\":1}"))).await;
        let mut req = get("/api/comments");
        req.method = reqwest::Method::POST;

        network_first_json(&ctx, &req).await;

        assert!(!ctx.primary.contains(&req.cache_key()).await.unwrap());
        assert_eq!(ctx.primary.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_navigation_fallback_is_offline_document() {
        let ctx = context(Arc::new(FakeNetwork::offline())).await;

        let offline_req = get("/offline.html");
        let page = Response::synthetic(StatusCode::OK, "text/html", "<h1>offline</h1>");
        ctx.primary.put(&stored_from(&offline_req, &page)).await.unwrap();

        let req = Request::navigate(Url::parse("http://localhost:4173/post/42").unwrap());
        let response = network_first_navigation(&ctx, &req).await;

        // The dedicated fallback document, not a 404 and not the request's key.
        assert_eq!(&response.body[..], b"<h1>offline</h1>");
        assert_eq!(response.source, Source::Fallback);
    }

    #[tokio::test]
    async fn test_navigation_prefers_own_cached_page() {
        let seeded = context(Arc::new(FakeNetwork::ok(b"<html>post 42</html>"))).await;
        let req = Request::navigate(Url::parse("http://localhost:4173/post/42").unwrap());
        network_first_navigation(&seeded, &req).await;

        let ctx = PolicyContext { network: Arc::new(FakeNetwork::offline()), ..seeded };
        let response = network_first_navigation(&ctx, &req).await;

        assert_eq!(response.source, Source::Cache);
        assert_eq!(&response.body[..], b"<html>post 42</html>");
    }
}
