//! Per-customer storefront session.
//!
//! Holds what the storefront remembers between requests that the backend does
//! not: currently just the coupon applied to the cart. Writers broadcast a
//! [`SessionChange`] so views can refresh without polling.
//!
//! Sessions idle for longer than the store's TTL are dropped, either when the
//! customer next reads them or by the periodic sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::aggregates::Coupon;

const CHANGE_BUFFER: usize = 64;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Debug)]
pub struct Session {
    pub coupon: Option<Coupon>,
    touched_at: Instant,
}

impl Session {
    fn fresh() -> Self { Self { coupon: None, touched_at: Instant::now() } }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool { now.saturating_duration_since(self.touched_at) >= ttl }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionChange {
    CouponApplied { customer: String, code: String },
    CouponCleared { customer: String },
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    changes: broadcast::Sender<SessionChange>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self { Self::new() }
}

impl SessionStore {
    pub fn new() -> Self { Self::with_ttl(DEFAULT_SESSION_TTL) }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), changes, ttl }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> { self.changes.subscribe() }

    /// The customer's coupon, refreshing the session. An expired session is removed instead.
    pub async fn coupon(&self, customer: &str) -> Option<Coupon> {
        let now = Instant::now();
        let expired = {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(customer) else { return None };
            if !session.is_expired(self.ttl, now) {
                session.touched_at = now;
                return session.coupon.clone();
            }
            sessions.remove(customer)
        };
        if expired.is_some() {
            debug!(customer, "session expired");
            self.notify(SessionChange::CouponCleared { customer: customer.to_string() });
        }
        None
    }

    /// Stores `coupon` for the customer, replacing any previous one.
    pub async fn apply_coupon(&self, customer: &str, coupon: Coupon) {
        let code = coupon.code.to_string();
        {
            let mut sessions = self.sessions.write().await;
            let session = sessions.entry(customer.to_string()).or_insert_with(Session::fresh);
            session.coupon = Some(coupon);
            session.touched_at = Instant::now();
        }
        self.notify(SessionChange::CouponApplied { customer: customer.to_string(), code });
    }

    /// Drops the customer's coupon; returns it if there was one.
    pub async fn clear_coupon(&self, customer: &str) -> Option<Coupon> {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let removed = sessions.get_mut(customer).and_then(|s| s.coupon.take());
            if sessions.get(customer).is_some_and(|s| s.coupon.is_none()) {
                sessions.remove(customer);
            }
            removed
        };
        if removed.is_some() {
            self.notify(SessionChange::CouponCleared { customer: customer.to_string() });
        }
        removed
    }

    pub async fn active_sessions(&self) -> usize { self.sessions.read().await.len() }

    /// Removes every session idle for longer than the TTL; returns how many went.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = {
            let mut sessions = self.sessions.write().await;
            let keys: Vec<String> = sessions.iter().filter(|(_, s)| s.is_expired(self.ttl, now)).map(|(k, _)| k.clone()).collect();
            keys.into_iter().filter(|k| sessions.remove(k).is_some()).collect()
        };
        for customer in &expired {
            self.notify(SessionChange::CouponCleared { customer: customer.clone() });
        }
        expired.len()
    }

    /// Runs [`sweep_expired`](Self::sweep_expired) every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = store.sweep_expired().await;
                if removed > 0 {
                    let remaining = store.active_sessions().await;
                    info!(removed, remaining, "expired sessions swept");
                }
            }
        })
    }

    fn notify(&self, change: SessionChange) {
        // No subscribers is the common case and not an error.
        if self.changes.send(change).is_err() {
            debug!("session change dropped, no subscribers");
        }
    }
}
