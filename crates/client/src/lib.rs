//! Request interception layer for inkgate.
//!
//! This crate provides the pipeline every application request passes
//! through: classification, per-class caching policy, offline fallbacks,
//! and the lifecycle controller that warms and retires cache generations.

pub mod classify;
pub mod fetch;
pub mod lifecycle;
pub mod offline;
pub mod policy;
pub mod request;

pub use classify::{Classification, Classifier, Policy};
pub use reqwest::{Method, StatusCode};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Network};
pub use lifecycle::{Gateway, Handled, Phase};
pub use offline::OfflineProvider;
pub use request::{Request, Response, Source};
