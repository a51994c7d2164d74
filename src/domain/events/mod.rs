//! Domain events
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Something a customer did that other parts of the system may react to.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorefrontEvent {
    CartChanged { customer: String, line_count: usize, item_count: u32 },
    CouponApplied { customer: String, code: String, discount: Decimal },
    CouponRemoved { customer: String, code: String },
    OrderPlaced { customer: String, order_id: String, total: Decimal, currency: String },
    WishlistToggled { customer: String, product_id: String, in_wishlist: bool },
    ReviewSubmitted { customer: String, product_id: String, rating: u8 },
}

impl StorefrontEvent {
    /// Subject suffix the event is published under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CartChanged { .. } => "cart_changed",
            Self::CouponApplied { .. } => "coupon_applied",
            Self::CouponRemoved { .. } => "coupon_removed",
            Self::OrderPlaced { .. } => "order_placed",
            Self::WishlistToggled { .. } => "wishlist_toggled",
            Self::ReviewSubmitted { .. } => "review_submitted",
        }
    }
}

/// Event plus the envelope it travels in.
#[derive(Clone, Debug, Serialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: StorefrontEvent,
}

impl EventEnvelope {
    pub fn new(event: StorefrontEvent) -> Self { Self { id: Uuid::now_v7(), occurred_at: Utc::now(), event } }
}
