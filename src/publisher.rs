//! Fan-out of storefront events to in-process subscribers and, optionally, NATS.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::events::{EventEnvelope, StorefrontEvent};

const EVENT_BUFFER: usize = 256;

#[derive(Clone)]
pub struct EventPublisher {
    local: broadcast::Sender<EventEnvelope>,
    nats: Option<async_nats::Client>,
    subject_prefix: String,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>, subject_prefix: impl Into<String>) -> Self {
        let (local, _) = broadcast::channel(EVENT_BUFFER);
        Self { local, nats, subject_prefix: subject_prefix.into() }
    }

    /// Publisher without NATS forwarding.
    pub fn local_only() -> Self { Self::new(None, "storefront") }

    /// Connects to NATS when `url` is set. A failed connection is logged and
    /// the publisher falls back to local delivery only.
    pub async fn connect(url: Option<&str>, subject_prefix: &str) -> Self {
        let nats = match url {
            Some(url) => match async_nats::connect(url).await {
                Ok(client) => {
                    info!(%url, "forwarding storefront events to NATS");
                    Some(client)
                }
                Err(e) => {
                    warn!(%url, error = %e, "NATS unavailable, events stay in-process");
                    None
                }
            },
            None => None,
        };
        Self::new(nats, subject_prefix)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> { self.local.subscribe() }

    pub fn subject_for(&self, event: &StorefrontEvent) -> String { format!("{}.{}", self.subject_prefix, event.name()) }

    /// Publishing never fails the caller; delivery problems are logged.
    pub async fn publish(&self, event: StorefrontEvent) {
        let envelope = EventEnvelope::new(event);
        debug!(event = envelope.event.name(), id = %envelope.id, "storefront event");

        if let Some(client) = &self.nats {
            let subject = self.subject_for(&envelope.event);
            match serde_json::to_vec(&envelope) {
                Ok(payload) => {
                    if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                        warn!(%subject, error = %e, "failed to publish event to NATS");
                    }
                }
                Err(e) => warn!(%subject, error = %e, "failed to encode event"),
            }
        }

        // Err only means nobody is listening in-process.
        let _ = self.local.send(envelope);
    }
}
