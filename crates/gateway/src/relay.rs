//! Side-channel relay: out-of-band signals unrelated to caching.
//!
//! Stateless message-to-message mapping. A push payload becomes a
//! notification for the host to display; a notification click becomes a
//! navigation target. There is no retry or queue; a dismissed
//! notification is simply dropped.

use crate::protocol::{Inbound, Outbound};

/// Map one side-channel message to its reply, if any.
///
/// `FETCH` messages are not side-channel traffic and return None here;
/// the handler routes them through the cache pipeline instead.
pub fn relay(msg: Inbound, generation: &str) -> Option<Outbound> {
    match msg {
        Inbound::GetVersion => Some(Outbound::SwVersion { version: generation.to_string() }),
        Inbound::Push { title, body, url } => Some(Outbound::Notify { title, body, url }),
        Inbound::NotificationClicked { url } => Some(Outbound::Navigate { url }),
        Inbound::Sync { tag } => {
            // Deferred sync needs a durable outbox; until one exists the
            // registration is acknowledged by doing nothing.
            tracing::debug!(%tag, "deferred sync requested, dropping");
            None
        }
        Inbound::Fetch { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_query_answers_generation() {
        let reply = relay(Inbound::GetVersion, "v2");
        assert!(matches!(reply, Some(Outbound::SwVersion { version }) if version == "v2"));
    }

    #[test]
    fn test_push_becomes_notify() {
        let msg = Inbound::Push {
            title: "New comment".into(),
            body: "Someone replied to your thought".into(),
            url: "/thought/abc".into(),
        };
        match relay(msg, "v1") {
            Some(Outbound::Notify { title, url, .. }) => {
                assert_eq!(title, "New comment");
                assert_eq!(url, "/thought/abc");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_click_becomes_navigate() {
        let reply = relay(Inbound::NotificationClicked { url: "/post/42".into() }, "v1");
        assert!(matches!(reply, Some(Outbound::Navigate { url }) if url == "/post/42"));
    }

    #[test]
    fn test_sync_is_dropped() {
        assert!(relay(Inbound::Sync { tag: "comment-outbox".into() }, "v1").is_none());
    }
}
