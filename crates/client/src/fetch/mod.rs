//! HTTP fetch pipeline behind an injectable network seam.
//!
//! Policies never talk to reqwest directly; they hold an `Arc<dyn Network>`
//! so tests can substitute deterministic fakes. The production
//! implementation is [`FetchClient`].
//!
//! Unlike a general-purpose fetcher, a resolved non-2xx response here is
//! `Ok`: policies must be able to return it to the caller unmodified.
//! Errors are transport-level only (DNS, connection, timeout, size cap).

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url, header};

pub use self::url::{UrlError, canonicalize, same_origin};

use crate::request::{Request, Response, Source};
use inkgate_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "inkgate/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "inkgate/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    /// Derive fetch settings from the application configuration.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Convert into the response shape handed back to the application.
    pub fn into_response(self) -> Response {
        Response { status: self.status, headers: self.headers, body: self.bytes, source: Source::Network }
    }
}

/// The network seam every policy fetches through.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request, returning any resolved response as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures (DNS, connection,
    /// timeout) or responses exceeding the configured size limit.
    async fn fetch(&self, req: &Request) -> Result<FetchResponse, Error>;
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, req: &Request) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut request = self.http.request(req.method.clone(), req.url.clone());
        if let Some(accept) = &req.accept {
            request = request.header(header::ACCEPT, accept);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::TooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::TooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            url = %req.url,
            status = status.as_u16(),
            fetch_ms,
            bytes = bytes.len(),
            "fetched upstream"
        );

        Ok(FetchResponse { url: req.url.clone(), final_url, status, headers, bytes, fetch_ms })
    }
}
