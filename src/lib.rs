//! Bakery Storefront
//!
//! Customer-facing gateway in front of the bakery's REST backend.
//!
//! ## Features
//! - Product catalog, categories and reviews
//! - Cart management with local pricing (coupons, shipping, grand total)
//! - Checkout and order history
//! - Addresses, wishlist and profile
//! - Storefront events, in-process and over NATS

pub mod api;
pub mod backend;
pub mod config;
pub mod domain;
pub mod publisher;
pub mod session;
pub mod state;

pub use api::router;
pub use state::AppState;

use thiserror::Error;

use backend::BackendError;
use domain::aggregates::{CartError, CouponError};
use domain::value_objects::{MoneyError, QuantityError};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("sign in to continue")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Quantity(#[from] QuantityError),

    #[error("cart could not be priced: {0}")]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
