//! HTTP surface of the storefront.
//!
//! Everything except `/health` lives under `/api/v1`.

mod account;
mod auth;
mod cart;
mod catalog;
mod checkout;
mod error;
mod pages;
mod reviews;

pub use auth::Customer;
pub use error::ErrorBody;
pub use pages::InfoPage;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/pages/:slug", get(pages::show))
        // Account
        .route("/auth/register", post(account::register))
        .route("/auth/login", post(account::login))
        .route("/profile", get(account::get_profile).put(account::update_profile))
        .route("/addresses", get(account::list_addresses).post(account::create_address))
        .route("/addresses/:id", put(account::update_address).delete(account::delete_address))
        .route("/addresses/:id/default", post(account::set_default_address))
        .route("/wishlist", get(account::list_wishlist))
        .route("/wishlist/:product_id", post(account::toggle_wishlist))
        // Catalog
        .route("/products", get(catalog::list_products))
        .route("/products/:id", get(catalog::get_product))
        .route("/products/:id/reviews", get(reviews::list_reviews).post(reviews::create_review))
        .route("/categories", get(catalog::list_categories))
        // Cart
        .route("/cart", get(cart::get_cart).post(cart::add_line).delete(cart::clear_cart))
        .route("/cart/lines/:line_id", put(cart::update_line).delete(cart::remove_line))
        .route("/cart/coupon", post(cart::apply_coupon).delete(cart::remove_coupon))
        .route("/coupons", get(cart::list_coupons))
        // Orders
        .route("/checkout", post(checkout::place_order))
        .route("/orders", get(checkout::list_orders))
        .route("/orders/:id", get(checkout::get_order))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": env!("CARGO_PKG_NAME") }))
}
