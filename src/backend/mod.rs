//! REST client for the bakery backend.
//!
//! Every call goes through [`BackendClient::send`], which attaches the
//! customer's bearer token, maps non-success statuses to [`BackendError::Status`]
//! and peels response envelopes before typed decoding.

mod envelope;
mod wire;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::domain::aggregates::{
    Address, AddressInput, Cart, Category, Coupon, LoginInput, Order, OrderRequest, Page, Product, ProductQuery,
    Profile, ProfileUpdate, RegisterInput, Review, ReviewInput, SignedIn, Wishlist,
};
use crate::domain::value_objects::{CouponCode, Quantity};
use envelope::{error_message, total_hint, unwrap_payload};
use wire::{
    CouponCheck, WireAddress, WireAuth, WireCart, WireCategory, WireCoupon, WireOrder, WireProduct, WireReview, WireUser,
    WishlistEntry,
};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend responded {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("unexpected backend payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected backend payload: {0}")]
    Shape(String),
}

impl BackendError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool { self.status() == Some(StatusCode::NOT_FOUND) }
}

/// Customer credential forwarded to the backend as `Authorization: Bearer`.
#[derive(Clone, Copy)]
pub struct Bearer<'a>(pub &'a str);

impl std::fmt::Debug for Bearer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("Bearer(..)") }
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    currency: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration, currency: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), currency: currency.to_string() })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn request(&self, method: Method, path: &str, auth: Option<Bearer<'_>>) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path)).header(reqwest::header::ACCEPT, "application/json");
        match auth {
            Some(Bearer(token)) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!(%status, %message, "backend rejected request");
            return Err(BackendError::Status { status, message });
        }
        debug!(%status, "backend responded");
        Ok(body)
    }

    async fn call(&self, method: Method, path: &str, auth: Option<Bearer<'_>>) -> Result<Value, BackendError> {
        self.send(self.request(method, path, auth)).await
    }

    async fn call_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, auth: Option<Bearer<'_>>, body: &B) -> Result<Value, BackendError> {
        self.send(self.request(method, path, auth).json(body)).await
    }

    fn decode<T: DeserializeOwned>(value: Value, keys: &[&str]) -> Result<T, BackendError> {
        Ok(serde_json::from_value(unwrap_payload(value, keys))?)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, BackendError> {
        let mut params: Vec<(&str, String)> = vec![("page", query.page.to_string()), ("limit", query.per_page.to_string())];
        if let Some(category) = &query.category { params.push(("category", category.clone())); }
        if let Some(search) = &query.search { params.push(("search", search.clone())); }

        let body = self.send(self.request(Method::GET, "/products", None).query(&params)).await?;
        let total = total_hint(&body);
        let wire: Vec<WireProduct> = Self::decode(body, &["products", "items"])?;
        let items: Vec<Product> = wire.into_iter().map(|p| p.into_product(&self.currency)).collect();
        Ok(Page { total: total.unwrap_or(items.len() as u64), items, page: query.page, per_page: query.per_page })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Product, BackendError> {
        let body = self.call(Method::GET, &format!("/products/{id}"), None).await?;
        let wire: WireProduct = Self::decode(body, &["product"])?;
        Ok(wire.into_product(&self.currency))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        let body = self.call(Method::GET, "/categories", None).await?;
        let wire: Vec<WireCategory> = Self::decode(body, &["categories"])?;
        Ok(wire.into_iter().map(WireCategory::into_category).collect())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    fn cart_from(&self, body: Value) -> Result<Cart, BackendError> {
        if body.is_null() { return Ok(Cart::new(&self.currency)); }
        let wire: WireCart = Self::decode(body, &["cart"])?;
        Ok(wire.into_cart(&self.currency))
    }

    /// A customer who never added anything may have no cart yet; that reads as empty.
    #[instrument(skip_all)]
    pub async fn get_cart(&self, auth: Bearer<'_>) -> Result<Cart, BackendError> {
        match self.call(Method::GET, "/cart", Some(auth)).await {
            Ok(body) => self.cart_from(body),
            Err(e) if e.is_not_found() => Ok(Cart::new(&self.currency)),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, auth))]
    pub async fn add_to_cart(&self, auth: Bearer<'_>, product_id: &str, variant_id: Option<&str>, quantity: Quantity) -> Result<Cart, BackendError> {
        let payload = json!({ "productId": product_id, "variantId": variant_id, "quantity": quantity.value() });
        let body = self.call_json(Method::POST, "/cart", Some(auth), &payload).await?;
        self.cart_after_mutation(auth, body).await
    }

    #[instrument(skip(self, auth))]
    pub async fn update_cart_line(&self, auth: Bearer<'_>, line_id: &str, quantity: Quantity) -> Result<Cart, BackendError> {
        let payload = json!({ "quantity": quantity.value() });
        let body = self.call_json(Method::PUT, &format!("/cart/{line_id}"), Some(auth), &payload).await?;
        self.cart_after_mutation(auth, body).await
    }

    #[instrument(skip(self, auth))]
    pub async fn remove_cart_line(&self, auth: Bearer<'_>, line_id: &str) -> Result<Cart, BackendError> {
        let body = self.call(Method::DELETE, &format!("/cart/{line_id}"), Some(auth)).await?;
        self.cart_after_mutation(auth, body).await
    }

    #[instrument(skip_all)]
    pub async fn clear_cart(&self, auth: Bearer<'_>) -> Result<(), BackendError> {
        self.call(Method::DELETE, "/cart", Some(auth)).await?;
        Ok(())
    }

    /// Mutations answer with the updated cart on most deployments; when they
    /// answer with something else (an acknowledgement, a single line) the cart is re-read.
    async fn cart_after_mutation(&self, auth: Bearer<'_>, body: Value) -> Result<Cart, BackendError> {
        let payload = unwrap_payload(body, &["cart"]);
        let looks_like_cart = ["items", "cartItems"].iter().any(|k| payload.get(k).is_some_and(Value::is_array));
        if looks_like_cart { self.cart_from(payload) } else { self.get_cart(auth).await }
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, BackendError> {
        let body = self.call(Method::GET, "/coupons", None).await?;
        let wire: Vec<WireCoupon> = Self::decode(body, &["coupons"])?;
        Ok(wire
            .into_iter()
            .filter_map(|c| c.into_coupon().map_err(|reason| warn!(%reason, "skipping coupon")).ok())
            .collect())
    }

    /// Looks a code up with the backend. A 404 means the code does not exist.
    #[instrument(skip(self, auth))]
    pub async fn validate_coupon(&self, auth: Bearer<'_>, code: &CouponCode, cart_total: Decimal) -> Result<Option<Coupon>, BackendError> {
        let payload = CouponCheck { code: code.as_str(), cart_total };
        match self.call_json(Method::POST, "/coupons/validate", Some(auth), &payload).await {
            Ok(body) => {
                let wire: WireCoupon = Self::decode(body, &["coupon"])?;
                wire.into_coupon().map(Some).map_err(BackendError::Shape)
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    #[instrument(skip_all)]
    pub async fn create_order(&self, auth: Bearer<'_>, order: &OrderRequest) -> Result<Order, BackendError> {
        let body = self.call_json(Method::POST, "/orders", Some(auth), order).await?;
        let wire: WireOrder = Self::decode(body, &["order"])?;
        Ok(wire.into_order(&self.currency))
    }

    #[instrument(skip_all)]
    pub async fn list_orders(&self, auth: Bearer<'_>) -> Result<Vec<Order>, BackendError> {
        let body = self.call(Method::GET, "/orders", Some(auth)).await?;
        let wire: Vec<WireOrder> = Self::decode(body, &["orders"])?;
        Ok(wire.into_iter().map(|o| o.into_order(&self.currency)).collect())
    }

    #[instrument(skip(self, auth))]
    pub async fn get_order(&self, auth: Bearer<'_>, id: &str) -> Result<Order, BackendError> {
        let body = self.call(Method::GET, &format!("/orders/{id}"), Some(auth)).await?;
        let wire: WireOrder = Self::decode(body, &["order"])?;
        Ok(wire.into_order(&self.currency))
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    #[instrument(skip_all)]
    pub async fn list_addresses(&self, auth: Bearer<'_>) -> Result<Vec<Address>, BackendError> {
        let body = self.call(Method::GET, "/addresses", Some(auth)).await?;
        let wire: Vec<WireAddress> = Self::decode(body, &["addresses"])?;
        Ok(wire.into_iter().map(WireAddress::into_address).collect())
    }

    #[instrument(skip_all)]
    pub async fn create_address(&self, auth: Bearer<'_>, input: &AddressInput) -> Result<Address, BackendError> {
        let body = self.call_json(Method::POST, "/addresses", Some(auth), input).await?;
        let wire: WireAddress = Self::decode(body, &["address"])?;
        Ok(wire.into_address())
    }

    #[instrument(skip(self, auth, input))]
    pub async fn update_address(&self, auth: Bearer<'_>, id: &str, input: &AddressInput) -> Result<Address, BackendError> {
        let body = self.call_json(Method::PUT, &format!("/addresses/{id}"), Some(auth), input).await?;
        let wire: WireAddress = Self::decode(body, &["address"])?;
        Ok(wire.into_address())
    }

    #[instrument(skip(self, auth))]
    pub async fn delete_address(&self, auth: Bearer<'_>, id: &str) -> Result<(), BackendError> {
        self.call(Method::DELETE, &format!("/addresses/{id}"), Some(auth)).await?;
        Ok(())
    }

    #[instrument(skip(self, auth))]
    pub async fn set_default_address(&self, auth: Bearer<'_>, id: &str) -> Result<(), BackendError> {
        self.call(Method::PATCH, &format!("/addresses/{id}/default"), Some(auth)).await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    #[instrument(skip_all)]
    pub async fn get_wishlist(&self, auth: Bearer<'_>) -> Result<Wishlist, BackendError> {
        let body = self.call(Method::GET, "/wishlist", Some(auth)).await?;
        if body.is_null() { return Ok(Wishlist { items: vec![] }); }
        let entries: Vec<WishlistEntry> = Self::decode(body, &["wishlist", "products", "items"])?;
        Ok(Wishlist { items: entries.into_iter().map(|e| e.into_product(&self.currency)).collect() })
    }

    #[instrument(skip(self, auth))]
    pub async fn add_to_wishlist(&self, auth: Bearer<'_>, product_id: &str) -> Result<(), BackendError> {
        self.call_json(Method::POST, "/wishlist", Some(auth), &json!({ "productId": product_id })).await?;
        Ok(())
    }

    #[instrument(skip(self, auth))]
    pub async fn remove_from_wishlist(&self, auth: Bearer<'_>, product_id: &str) -> Result<(), BackendError> {
        self.call(Method::DELETE, &format!("/wishlist/{product_id}"), Some(auth)).await?;
        Ok(())
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list_reviews(&self, product_id: &str) -> Result<Vec<Review>, BackendError> {
        let body = self.call(Method::GET, &format!("/products/{product_id}/reviews"), None).await?;
        let wire: Vec<WireReview> = Self::decode(body, &["reviews"])?;
        Ok(wire.into_iter().map(|r| r.into_review(product_id)).collect())
    }

    #[instrument(skip(self, auth, input))]
    pub async fn create_review(&self, auth: Bearer<'_>, product_id: &str, input: &ReviewInput) -> Result<Review, BackendError> {
        let body = self.call_json(Method::POST, &format!("/products/{product_id}/reviews"), Some(auth), input).await?;
        let wire: WireReview = Self::decode(body, &["review"])?;
        Ok(wire.into_review(product_id))
    }

    // =========================================================================
    // Account
    // =========================================================================

    #[instrument(skip_all)]
    pub async fn register(&self, input: &RegisterInput) -> Result<SignedIn, BackendError> {
        let body = self.call_json(Method::POST, "/auth/register", None, input).await?;
        Self::signed_in(body)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, input: &LoginInput) -> Result<SignedIn, BackendError> {
        let body = self.call_json(Method::POST, "/auth/login", None, input).await?;
        Self::signed_in(body)
    }

    fn signed_in(body: Value) -> Result<SignedIn, BackendError> {
        let wire: WireAuth = serde_json::from_value(unwrap_payload(body, &[]))?;
        wire.into_signed_in().map_err(BackendError::Shape)
    }

    #[instrument(skip_all)]
    pub async fn get_profile(&self, auth: Bearer<'_>) -> Result<Profile, BackendError> {
        let body = self.call(Method::GET, "/users/profile", Some(auth)).await?;
        let wire: WireUser = Self::decode(body, &["user", "profile"])?;
        Ok(wire.into_profile())
    }

    #[instrument(skip_all)]
    pub async fn update_profile(&self, auth: Bearer<'_>, update: &ProfileUpdate) -> Result<Profile, BackendError> {
        let body = self.call_json(Method::PUT, "/users/profile", Some(auth), update).await?;
        let wire: WireUser = Self::decode(body, &["user", "profile"])?;
        Ok(wire.into_profile())
    }
}
