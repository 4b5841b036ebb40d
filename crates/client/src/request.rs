//! Intercepted request and response model.
//!
//! Every request the application issues arrives here as a [`Request`]; every
//! policy hands back a [`Response`] with the same shape contract (status,
//! headers, body) regardless of whether it came from the network, a store,
//! or a synthetic fallback.

use bytes::Bytes;
use reqwest::{Method, StatusCode, header::HeaderMap};
use url::Url;

use inkgate_core::StoredResponse;
use inkgate_core::store::key::entry_key;

/// An intercepted outgoing request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    /// Declared accept media type, if the caller sent one.
    pub accept: Option<String>,
    /// Whether this is a browser navigation (top-level document load).
    pub navigation: bool,
}

impl Request {
    /// A plain GET for a resource.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, accept: None, navigation: false }
    }

    /// A top-level navigation to a document.
    pub fn navigate(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            accept: Some("text/html,application/xhtml+xml".to_string()),
            navigation: true,
        }
    }

    /// Build a request from wire-level parts. Returns None for a method
    /// token HTTP does not know.
    pub fn from_parts(method: &str, url: Url, accept: Option<String>, navigation: bool) -> Option<Self> {
        let method = Method::from_bytes(method.as_bytes()).ok()?;
        Some(Self { method, url, accept, navigation })
    }

    /// Cache key for this request (method + canonical URL).
    pub fn cache_key(&self) -> String {
        entry_key(self.method.as_str(), self.url.as_str())
    }

    /// ASCII serialization of the request's origin, e.g. `https://example.com`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Lowercased file extension of the last path segment, if any.
    pub fn extension(&self) -> Option<String> {
        let path = self.url.path();
        let segment = path.rsplit('/').next()?;
        let (_, ext) = segment.rsplit_once('.')?;
        if ext.is_empty() { None } else { Some(ext.to_ascii_lowercase()) }
    }
}

/// Where a response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Live network response.
    Network,
    /// Served from a cache store.
    Cache,
    /// Synthetic offline fallback.
    Fallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Network => "network",
            Source::Cache => "cache",
            Source::Fallback => "fallback",
        }
    }
}

/// The response handed back to the application.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub source: Source,
}

impl Response {
    /// Build a synthetic response with a single content-type header.
    pub fn synthetic(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = content_type.parse() {
            headers.insert(reqwest::header::CONTENT_TYPE, value);
        }
        Self { status, headers, body: body.into(), source: Source::Fallback }
    }

    /// Rehydrate a response from a stored cache entry.
    pub fn from_stored(entry: StoredResponse) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in &entry.headers {
            if let (Ok(name), Ok(value)) = (
                reqwest::header::HeaderName::from_bytes(name.as_bytes()),
                reqwest::header::HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }
        Self {
            status: StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK),
            headers,
            body: Bytes::from(entry.body),
            source: Source::Cache,
        }
    }

    /// Headers as plain string pairs, dropping non-UTF-8 values.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        header_pairs(&self.headers)
    }
}

/// Flatten a header map into string pairs, dropping non-UTF-8 values.
pub fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Build the cache entry for a request/response pair.
pub fn stored_from(req: &Request, response: &Response) -> StoredResponse {
    StoredResponse {
        key: req.cache_key(),
        method: req.method.as_str().to_string(),
        url: req.url.as_str().to_string(),
        status: response.status.as_u16(),
        headers: response.header_pairs(),
        body: response.body.to_vec(),
        stored_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_cache_key_is_method_qualified() {
        let get = Request::get(url("http://localhost:4173/api/posts"));
        let mut head = get.clone();
        head.method = Method::HEAD;
        assert_ne!(get.cache_key(), head.cache_key());
    }

    #[test]
    fn test_origin_serialization() {
        let req = Request::get(url("http://localhost:4173/api/posts?page=1"));
        assert_eq!(req.origin(), "http://localhost:4173");
    }

    #[test]
    fn test_extension() {
        assert_eq!(Request::get(url("http://x.test/img/photo.jpg")).extension(), Some("jpg".into()));
        assert_eq!(Request::get(url("http://x.test/img/PHOTO.JPG")).extension(), Some("jpg".into()));
        assert_eq!(Request::get(url("http://x.test/post/42")).extension(), None);
        assert_eq!(Request::get(url("http://x.test/")).extension(), None);
    }

    #[test]
    fn test_navigate_accepts_html() {
        let req = Request::navigate(url("http://x.test/post/42"));
        assert!(req.navigation);
        assert!(req.accept.as_deref().unwrap().contains("text/html"));
    }

    #[test]
    fn test_stored_roundtrip() {
        let req = Request::get(url("http://localhost:4173/api/posts"));
        let response = Response::synthetic(StatusCode::OK, "application/json", &b"{\"ok\":true}"[..]);
        let entry = stored_from(&req, &response);
        assert_eq!(entry.status, 200);
        assert_eq!(entry.method, "GET");

        let back = Response::from_stored(entry);
        assert_eq!(back.status, StatusCode::OK);
        assert_eq!(back.source, Source::Cache);
        assert_eq!(&back.body[..], b"{\"ok\":true}");
        assert_eq!(
            back.headers.get(reqwest::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
