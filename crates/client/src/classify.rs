//! Request classification.
//!
//! Assigns every intercepted request to exactly one caching policy via an
//! ordered rule table: first match wins, and cross-origin requests are
//! rejected before any rule runs. The unconditional default makes a
//! classification miss impossible for same-origin traffic.

use crate::request::Request;
use inkgate_core::AppConfig;
use reqwest::Method;

/// The caching strategy assigned to a request class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// API calls: live data preferred, cached JSON then 503 envelope behind it.
    NetworkFirstJson,
    /// Images and video: serve cache immediately, refresh in the background.
    CacheFirstMediaRefresh,
    /// Document loads: live page preferred, cached page then offline document.
    NetworkFirstNavigation,
    /// Everything else same-origin: scripts, styles, fonts.
    CacheFirstDefault,
}

/// Outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Third-party request; the layer must not intercept it.
    Skip,
    /// Same-origin request handled under the given policy.
    Policy(Policy),
}

type Predicate = fn(&Classifier, &Request) -> bool;

/// Ordered classification rules. Evaluation order is fixed; the first
/// matching predicate decides the policy.
const RULES: &[(Predicate, Policy)] = &[
    (Classifier::is_api, Policy::NetworkFirstJson),
    (Classifier::is_media, Policy::CacheFirstMediaRefresh),
    (Classifier::is_navigation, Policy::NetworkFirstNavigation),
];

/// Classifies intercepted requests against the application's routing shape.
#[derive(Debug, Clone)]
pub struct Classifier {
    origin: String,
    api_prefix: String,
    media_extensions: Vec<String>,
}

impl Classifier {
    pub fn new(config: &AppConfig) -> Self {
        // Normalize through Url so "http://host:80" and "http://host" agree.
        let origin = url::Url::parse(&config.app_origin)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| config.app_origin.clone());
        Self {
            origin,
            api_prefix: config.api_prefix.clone(),
            media_extensions: config.media_extensions.clone(),
        }
    }

    /// The application origin this classifier intercepts for.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Assign a request to a policy, or skip it entirely.
    pub fn classify(&self, req: &Request) -> Classification {
        if req.origin() != self.origin {
            return Classification::Skip;
        }

        for (predicate, policy) in RULES {
            if predicate(self, req) {
                return Classification::Policy(*policy);
            }
        }

        Classification::Policy(Policy::CacheFirstDefault)
    }

    fn is_api(&self, req: &Request) -> bool {
        req.url.path().starts_with(&self.api_prefix)
    }

    fn is_media(&self, req: &Request) -> bool {
        match req.extension() {
            Some(ext) => self.media_extensions.iter().any(|known| *known == ext),
            None => false,
        }
    }

    fn is_navigation(&self, req: &Request) -> bool {
        if req.navigation {
            return true;
        }
        req.method == Method::GET
            && req
                .accept
                .as_deref()
                .is_some_and(|accept| accept.contains("text/html"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn classifier() -> Classifier {
        Classifier::new(&AppConfig::default())
    }

    fn get(path: &str) -> Request {
        Request::get(Url::parse(&format!("http://localhost:4173{path}")).unwrap())
    }

    #[test]
    fn test_cross_origin_is_skipped() {
        let req = Request::get(Url::parse("https://cdn.example.com/lib.js").unwrap());
        assert_eq!(classifier().classify(&req), Classification::Skip);
    }

    #[test]
    fn test_api_prefix_is_network_first_json() {
        assert_eq!(
            classifier().classify(&get("/api/posts?page=1")),
            Classification::Policy(Policy::NetworkFirstJson)
        );
    }

    #[test]
    fn test_media_extension_is_cache_first_refresh() {
        for path in ["/img/photo.jpg", "/media/clip.webm", "/icons/logo.SVG"] {
            assert_eq!(
                classifier().classify(&get(path)),
                Classification::Policy(Policy::CacheFirstMediaRefresh),
                "{path}"
            );
        }
    }

    #[test]
    fn test_navigation_flag() {
        let req = Request::navigate(Url::parse("http://localhost:4173/post/42").unwrap());
        assert_eq!(
            classifier().classify(&req),
            Classification::Policy(Policy::NetworkFirstNavigation)
        );
    }

    #[test]
    fn test_get_accepting_html_is_navigation() {
        let mut req = get("/about");
        req.accept = Some("text/html,application/xhtml+xml;q=0.9".into());
        assert_eq!(
            classifier().classify(&req),
            Classification::Policy(Policy::NetworkFirstNavigation)
        );
    }

    #[test]
    fn test_everything_else_is_default() {
        for path in ["/assets/index.js", "/assets/index.css", "/fonts/inter.woff2"] {
            assert_eq!(
                classifier().classify(&get(path)),
                Classification::Policy(Policy::CacheFirstDefault),
                "{path}"
            );
        }
    }

    #[test]
    fn test_api_wins_over_media_extension() {
        // Rule order is fixed: an API path that looks like media is still API.
        assert_eq!(
            classifier().classify(&get("/api/export/avatar.png")),
            Classification::Policy(Policy::NetworkFirstJson)
        );
    }

    #[test]
    fn test_api_post_still_classified() {
        let mut req = get("/api/comments");
        req.method = Method::POST;
        assert_eq!(
            classifier().classify(&req),
            Classification::Policy(Policy::NetworkFirstJson)
        );
    }
}
