//! Gateway lifecycle: warm-up, generation cutover, request dispatch.
//!
//! The controller moves through explicit phases instead of reacting to
//! ambient lifecycle events: `warm` seeds the app shell into the current
//! generation's primary store, `activate` evicts every store from prior
//! generations and starts taking traffic, and `handle` dispatches each
//! request through the classifier into its policy. Once active the
//! controller is passive; it plays no part in per-request handling beyond
//! dispatch.

use std::sync::Arc;

use crate::classify::{Classification, Classifier};
use crate::fetch::Network;
use crate::offline::OfflineProvider;
use crate::policy::{self, PolicyContext};
use crate::request::{Request, Response, stored_from};
use inkgate_core::{AppConfig, Error, Store, StoreNames, store::CacheDb, version};
use url::Url;

/// Lifecycle phase of a gateway instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, stores not yet seeded.
    Uninitialized,
    /// Warm-up ran (successfully or not); not yet taking traffic.
    Warming,
    /// Controlling traffic for the current generation.
    Active,
    /// Replaced by a newer generation; answers nothing.
    Superseded,
}

/// Outcome of handling an intercepted request.
#[derive(Debug)]
pub enum Handled {
    /// The layer produced a response (live, cached, or synthetic).
    Response(Response),
    /// Not intercepted: cross-origin traffic, or the gateway is not active.
    /// The caller performs its own fetch, unmediated.
    Bypass,
}

/// The lifecycle controller and per-request dispatcher.
pub struct Gateway {
    config: AppConfig,
    db: CacheDb,
    origin: Url,
    names: StoreNames,
    classifier: Classifier,
    ctx: PolicyContext,
    phase: Phase,
}

impl Gateway {
    /// Bind a gateway to the current generation's stores.
    ///
    /// Pure setup; nothing is fetched or written until [`Gateway::warm`].
    pub fn new(config: AppConfig, db: CacheDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = Url::parse(&config.app_origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let names = version::store_names(&config.generation);
        let primary = Store::new(db.clone(), names.primary.clone());
        let media = Store::new(db.clone(), names.media.clone());
        let classifier = Classifier::new(&config);
        let offline = OfflineProvider::new(&config, &origin);
        let ctx = PolicyContext {
            primary,
            media,
            origin: origin.origin().ascii_serialization(),
            network,
            offline,
        };
        Ok(Self { config, db, origin, names, classifier, ctx, phase: Phase::Uninitialized })
    }

    /// The generation this gateway serves.
    pub fn generation(&self) -> &str {
        &self.config.generation
    }

    /// The application origin requests are resolved against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seed the precache manifest into the primary store.
    ///
    /// Idempotent: if every manifest key is already present the call does
    /// nothing. Otherwise all missing assets are fetched first and written
    /// in a single transaction. Any fetch failure aborts the whole batch,
    /// so the shell cache is never half-seeded.
    pub async fn warm(&mut self) -> Result<(), Error> {
        self.phase = Phase::Warming;
        self.ctx.primary.ensure().await?;
        self.ctx.media.ensure().await?;

        let mut missing = Vec::new();
        for path in &self.config.precache {
            let url = self
                .origin
                .join(path)
                .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
            let req = Request::get(url);
            if !self.ctx.primary.contains(&req.cache_key()).await? {
                missing.push((path.clone(), req));
            }
        }

        if missing.is_empty() {
            tracing::debug!(generation = %self.config.generation, "precache already complete");
            return Ok(());
        }

        let mut entries = Vec::with_capacity(missing.len());
        for (path, req) in missing {
            let fetched = self
                .ctx
                .network
                .fetch(&req)
                .await
                .map_err(|e| Error::WarmupIncomplete(format!("{path}: {e}")))?;
            if fetched.status != reqwest::StatusCode::OK {
                return Err(Error::WarmupIncomplete(format!("{path}: status {}", fetched.status.as_u16())));
            }
            entries.push(stored_from(&req, &fetched.into_response()));
        }

        let count = entries.len();
        self.ctx.primary.put_many(entries).await?;
        tracing::info!(generation = %self.config.generation, count, "precache seeded");
        Ok(())
    }

    /// Cut over to this generation: evict every stale store, then begin
    /// accepting traffic.
    ///
    /// Eviction is best-effort: one store failing to delete neither blocks
    /// the others nor activation. In-flight reads against an outgoing
    /// generation finish normally; no new reads are issued against it once
    /// this returns.
    pub async fn activate(&mut self) -> Result<(), Error> {
        let all = self.db.store_names().await?;
        for name in version::stale_names(&all, &self.names) {
            match self.db.delete_store(&name).await {
                Ok(()) => tracing::info!(store = %name, "evicted stale store"),
                Err(err) => tracing::warn!(store = %name, %err, "failed to evict stale store"),
            }
        }
        self.phase = Phase::Active;
        tracing::info!(generation = %self.config.generation, "gateway active");
        Ok(())
    }

    /// Mark this instance replaced by a newer generation.
    pub fn supersede(&mut self) {
        self.phase = Phase::Superseded;
    }

    /// Dispatch one intercepted request.
    ///
    /// Cross-origin requests and requests arriving outside the active phase
    /// are bypassed without touching any store. Everything else resolves to
    /// a response; this call never fails.
    pub async fn handle(&self, req: Request) -> Handled {
        if self.phase != Phase::Active {
            return Handled::Bypass;
        }
        match self.classifier.classify(&req) {
            Classification::Skip => Handled::Bypass,
            Classification::Policy(policy) => {
                tracing::debug!(url = %req.url, ?policy, "dispatching");
                Handled::Response(policy::execute(&self.ctx, policy, &req).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::testutil::FakeNetwork;
    use crate::request::Source;
    use reqwest::StatusCode;

    fn config_for(generation: &str) -> AppConfig {
        AppConfig { generation: generation.to_string(), ..Default::default() }
    }

    async fn gateway_with(db: CacheDb, generation: &str, network: Arc<dyn Network>) -> Gateway {
        Gateway::new(config_for(generation), db, network).unwrap()
    }

    fn shell_request(config: &AppConfig, path: &str) -> Request {
        let origin = Url::parse(&config.app_origin).unwrap();
        Request::get(origin.join(path).unwrap())
    }

    #[tokio::test]
    async fn test_warm_seeds_full_manifest() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut gw = gateway_with(db, "v1", Arc::new(FakeNetwork::ok(b"asset"))).await;

        gw.warm().await.unwrap();

        let config = config_for("v1");
        for path in &config.precache {
            let req = shell_request(&config, path);
            assert!(gw.ctx.primary.contains(&req.cache_key()).await.unwrap(), "{path}");
        }
    }

    #[tokio::test]
    async fn test_warm_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(FakeNetwork::ok(b"asset"));
        let mut gw = gateway_with(db, "v1", network.clone()).await;

        gw.warm().await.unwrap();
        let fetches = network.calls();

        gw.warm().await.unwrap();
        assert_eq!(network.calls(), fetches, "fully populated warm-up must not refetch");
    }

    #[tokio::test]
    async fn test_warm_is_all_or_nothing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut gw = gateway_with(db, "v1", Arc::new(FakeNetwork::offline())).await;

        let result = gw.warm().await;

        assert!(matches!(result, Err(Error::WarmupIncomplete(_))));
        assert_eq!(gw.ctx.primary.count().await.unwrap(), 0, "no partial cache");
    }

    #[tokio::test]
    async fn test_warm_fails_on_non_200_asset() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut gw = gateway_with(db, "v1", Arc::new(FakeNetwork::status(StatusCode::NOT_FOUND, b""))).await;

        let result = gw.warm().await;

        assert!(matches!(result, Err(Error::WarmupIncomplete(_))));
        assert_eq!(gw.ctx.primary.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cutover_evicts_prior_generations() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network: Arc<dyn Network> = Arc::new(FakeNetwork::ok(b"asset"));

        let mut v1 = gateway_with(db.clone(), "v1", network.clone()).await;
        v1.warm().await.unwrap();
        v1.activate().await.unwrap();
        v1.supersede();

        let mut v2 = gateway_with(db.clone(), "v2", network).await;
        v2.warm().await.unwrap();
        v2.activate().await.unwrap();

        let names = db.store_names().await.unwrap();
        assert!(names.iter().all(|n| n.contains("-v2")), "stale stores remain: {names:?}");
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_post_cutover_shell_request_hits_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network: Arc<dyn Network> = Arc::new(FakeNetwork::ok(b"shell"));

        let mut v2 = gateway_with(db, "v2", network).await;
        v2.warm().await.unwrap();
        v2.activate().await.unwrap();

        // Network now down; the warmed asset must come from the v2 store.
        let offline = PolicyContext {
            network: Arc::new(FakeNetwork::offline()),
            ..v2.ctx.clone()
        };
        let gw = Gateway { ctx: offline, ..v2 };

        let req = shell_request(&config_for("v2"), "/index.html");
        match gw.handle(req).await {
            Handled::Response(response) => {
                assert_eq!(response.source, Source::Cache);
                assert_eq!(&response.body[..], b"shell");
            }
            Handled::Bypass => panic!("shell request must be intercepted"),
        }
    }

    #[tokio::test]
    async fn test_cross_origin_bypasses_without_store_access() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut gw = gateway_with(db, "v1", Arc::new(FakeNetwork::ok(b""))).await;
        gw.warm().await.unwrap();
        gw.activate().await.unwrap();
        let before = gw.ctx.primary.count().await.unwrap();

        let req = Request::get(Url::parse("https://analytics.example.com/beacon").unwrap());
        assert!(matches!(gw.handle(req).await, Handled::Bypass));
        assert_eq!(gw.ctx.primary.count().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_inactive_gateway_bypasses() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let gw = gateway_with(db, "v1", Arc::new(FakeNetwork::ok(b""))).await;
        assert_eq!(gw.phase(), Phase::Uninitialized);

        let req = shell_request(&config_for("v1"), "/index.html");
        assert!(matches!(gw.handle(req).await, Handled::Bypass));
    }

    #[tokio::test]
    async fn test_phase_transitions() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut gw = gateway_with(db, "v1", Arc::new(FakeNetwork::ok(b""))).await;
        assert_eq!(gw.phase(), Phase::Uninitialized);

        gw.warm().await.unwrap();
        assert_eq!(gw.phase(), Phase::Warming);

        gw.activate().await.unwrap();
        assert_eq!(gw.phase(), Phase::Active);

        gw.supersede();
        assert_eq!(gw.phase(), Phase::Superseded);
    }
}
