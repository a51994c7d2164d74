use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendClient, BackendError};
use crate::config::Config;
use crate::domain::pricing::PricingPolicy;
use crate::publisher::EventPublisher;
use crate::session::SessionStore;

/// Upper bound on how often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub sessions: SessionStore,
    pub events: EventPublisher,
    pub pricing: Arc<PricingPolicy>,
}

impl AppState {
    pub fn new(backend: BackendClient, pricing: PricingPolicy, events: EventPublisher) -> Self {
        Self { backend, sessions: SessionStore::new(), events, pricing: Arc::new(pricing) }
    }

    pub fn with_sessions(self, sessions: SessionStore) -> Self { Self { sessions, ..self } }

    /// Builds the state and starts the session sweeper; must run inside the tokio runtime.
    pub async fn from_config(config: &Config) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend_url, config.backend_timeout, &config.pricing.currency)?;
        let events = EventPublisher::connect(config.nats_url.as_deref(), &config.nats_subject_prefix).await;
        let sessions = SessionStore::with_ttl(config.session_ttl);
        sessions.spawn_sweeper(config.session_ttl.min(SWEEP_INTERVAL));
        Ok(Self::new(backend, config.pricing.clone(), events).with_sessions(sessions))
    }
}
