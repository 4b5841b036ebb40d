//! Per-message dispatch.
//!
//! Every `FETCH` runs as its own spawned task so slow upstreams never block
//! the channel; replies leave through a shared outbound queue in whatever
//! order the pipelines complete.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::protocol::{Inbound, Outbound, ResponseEnvelope};
use crate::relay;
use inkgate_client::{Gateway, Handled};

/// Routes inbound messages to the cache pipeline or the side-channel relay.
#[derive(Clone)]
pub struct MessageHandler {
    gateway: Arc<Gateway>,
    out: mpsc::Sender<Outbound>,
}

impl MessageHandler {
    pub fn new(gateway: Arc<Gateway>, out: mpsc::Sender<Outbound>) -> Self {
        Self { gateway, out }
    }

    /// Dispatch one message. Fetches are spawned; side-channel messages are
    /// answered inline.
    pub async fn dispatch(&self, msg: Inbound) {
        match msg {
            Inbound::Fetch { id, request } => {
                let gateway = Arc::clone(&self.gateway);
                let out = self.out.clone();
                tokio::spawn(async move {
                    let reply = match request.into_request(gateway.origin()) {
                        Some(req) => match gateway.handle(req).await {
                            Handled::Response(response) => {
                                Outbound::FetchResult { id, response: ResponseEnvelope::from_response(&response) }
                            }
                            Handled::Bypass => Outbound::FetchBypass { id },
                        },
                        None => {
                            tracing::warn!(id, "unresolvable fetch request, bypassing");
                            Outbound::FetchBypass { id }
                        }
                    };
                    if out.send(reply).await.is_err() {
                        tracing::warn!(id, "outbound channel closed, dropping reply");
                    }
                });
            }
            other => {
                if let Some(reply) = relay::relay(other, self.gateway.generation()) {
                    if self.out.send(reply).await.is_err() {
                        tracing::warn!("outbound channel closed, dropping reply");
                    }
                }
            }
        }
    }
}
