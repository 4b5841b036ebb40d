//! Wire types for the host application's messaging channel.
//!
//! One JSON object per line, tagged by `type`. Request bodies stay on the
//! application side; response bodies cross the channel hex-encoded so
//! binary media survives the text transport.

use inkgate_client::{Request, Response};
use serde::{Deserialize, Serialize};
use url::Url;

/// Messages the host application sends to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// Ask which cache generation is serving (UI build label).
    #[serde(rename = "GET_VERSION")]
    GetVersion,

    /// Push payload to surface as a system notification.
    #[serde(rename = "PUSH")]
    Push { title: String, body: String, url: String },

    /// The user activated a previously surfaced notification.
    #[serde(rename = "NOTIFICATION_CLICKED")]
    NotificationClicked { url: String },

    /// Deferred-sync registration. Currently a no-op placeholder.
    #[serde(rename = "SYNC")]
    Sync { tag: String },

    /// An outgoing request to run through the cache layer.
    #[serde(rename = "FETCH")]
    Fetch { id: u64, request: RequestEnvelope },
}

/// Messages the gateway sends back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "SW_VERSION")]
    SwVersion { version: String },

    #[serde(rename = "NOTIFY")]
    Notify { title: String, body: String, url: String },

    #[serde(rename = "NAVIGATE")]
    Navigate { url: String },

    #[serde(rename = "FETCH_RESULT")]
    FetchResult { id: u64, response: ResponseEnvelope },

    /// The request is not the gateway's to mediate; the application
    /// performs its own fetch.
    #[serde(rename = "FETCH_BYPASS")]
    FetchBypass { id: u64 },
}

/// A request as it crosses the channel. URLs may be root-relative; the
/// handler resolves them against the application origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub accept: Option<String>,
    #[serde(default)]
    pub navigate: bool,
}

impl RequestEnvelope {
    /// Resolve into an interceptable request. Returns None for URLs or
    /// method tokens the gateway cannot represent.
    pub fn into_request(self, origin: &Url) -> Option<Request> {
        let url = inkgate_client::fetch::canonicalize(origin, &self.url).ok()?;
        Request::from_parts(&self.method, url, self.accept, self.navigate)
    }
}

/// A response as it crosses the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body bytes, hex-encoded.
    pub body: String,
    /// Where the response came from: network, cache, or fallback.
    pub source: String,
}

impl ResponseEnvelope {
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: response.status.as_u16(),
            headers: response.header_pairs(),
            body: hex::encode(&response.body),
            source: response.source.as_str().to_string(),
        }
    }
}
