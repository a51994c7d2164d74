//! Cart and coupon handlers.
//!
//! Every response carries the cart priced with the customer's session coupon.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::Customer;
use crate::domain::aggregates::{Cart, CartLine, Coupon, CouponError};
use crate::domain::events::StorefrontEvent;
use crate::domain::pricing::{price_cart, CartTotals};
use crate::domain::value_objects::{CouponCode, Quantity};
use crate::{AppState, Result};

#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub totals: CartTotals,
    pub coupon: Option<Coupon>,
    /// Why the session coupon is not reducing the total, when it is not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddLine {
    pub product_id: String,
    pub variant_id: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 { 1 }

#[derive(Debug, Deserialize)]
pub struct UpdateLine {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApplyCoupon {
    pub code: String,
}

async fn view(state: &AppState, customer: &Customer, cart: Cart) -> Result<CartView> {
    let coupon = state.sessions.coupon(customer.key()).await;
    let subtotal = cart.subtotal()?;
    // A coupon that stopped applying (cart shrank below its minimum, window closed)
    // stays in the session but does not discount until it applies again.
    let notice = coupon.as_ref().and_then(|c| c.check_applicable(Utc::now(), subtotal).err()).map(|e| e.to_string());
    let active = coupon.as_ref().filter(|_| notice.is_none());
    let totals = price_cart(&cart, active, &state.pricing)?;
    Ok(CartView { cart, totals, coupon, coupon_notice: notice })
}

async fn changed(state: &AppState, customer: &Customer, cart: Cart) -> Result<CartView> {
    state
        .events
        .publish(StorefrontEvent::CartChanged { customer: customer.key().to_string(), line_count: cart.line_count(), item_count: cart.item_count() })
        .await;
    view(state, customer, cart).await
}

/// Sets a cart line to `quantity`, or removes it when `None`.
///
/// A line merged from several backend lines keeps its first backend line at
/// the new quantity; every other one is deleted.
async fn set_line(state: &AppState, customer: &Customer, line: &CartLine, quantity: Option<Quantity>) -> Result<Cart> {
    let mut cart = None;
    for (i, id) in line.backend_ids.iter().enumerate() {
        let updated = match quantity {
            Some(quantity) if i == 0 => state.backend.update_cart_line(customer.bearer(), id, quantity).await?,
            _ => state.backend.remove_cart_line(customer.bearer(), id).await?,
        };
        cart = Some(updated);
    }
    match cart {
        Some(cart) => Ok(cart),
        None => Ok(state.backend.get_cart(customer.bearer()).await?),
    }
}

pub async fn get_cart(State(s): State<AppState>, customer: Customer) -> Result<Json<CartView>> {
    let cart = s.backend.get_cart(customer.bearer()).await?;
    Ok(Json(view(&s, &customer, cart).await?))
}

#[instrument(skip(s, customer))]
pub async fn add_line(State(s): State<AppState>, customer: Customer, Json(body): Json<AddLine>) -> Result<Json<CartView>> {
    let quantity = Quantity::new(body.quantity)?;
    let cart = s.backend.add_to_cart(customer.bearer(), &body.product_id, body.variant_id.as_deref(), quantity).await?;
    Ok(Json(changed(&s, &customer, cart).await?))
}

/// A quantity of zero removes the line.
#[instrument(skip(s, customer))]
pub async fn update_line(State(s): State<AppState>, customer: Customer, Path(line_id): Path<String>, Json(body): Json<UpdateLine>) -> Result<Json<CartView>> {
    let quantity = match body.quantity {
        0 => None,
        n => Some(Quantity::new(n)?),
    };
    let current = s.backend.get_cart(customer.bearer()).await?;
    let line = current.line(&line_id)?;
    let cart = set_line(&s, &customer, line, quantity).await?;
    Ok(Json(changed(&s, &customer, cart).await?))
}

#[instrument(skip(s, customer))]
pub async fn remove_line(State(s): State<AppState>, customer: Customer, Path(line_id): Path<String>) -> Result<Json<CartView>> {
    let current = s.backend.get_cart(customer.bearer()).await?;
    let line = current.line(&line_id)?;
    let cart = set_line(&s, &customer, line, None).await?;
    Ok(Json(changed(&s, &customer, cart).await?))
}

pub async fn clear_cart(State(s): State<AppState>, customer: Customer) -> Result<Json<CartView>> {
    s.backend.clear_cart(customer.bearer()).await?;
    let cart = Cart::new(&s.pricing.currency);
    Ok(Json(changed(&s, &customer, cart).await?))
}

// =============================================================================
// Coupons
// =============================================================================

/// Coupons currently open to everyone.
pub async fn list_coupons(State(s): State<AppState>) -> Result<Json<Vec<Coupon>>> {
    let now = Utc::now();
    let coupons = s.backend.list_coupons().await?.into_iter().filter(|c| c.is_current(now)).collect();
    Ok(Json(coupons))
}

#[instrument(skip(s, customer, body), fields(code = %body.code))]
pub async fn apply_coupon(State(s): State<AppState>, customer: Customer, Json(body): Json<ApplyCoupon>) -> Result<Json<CartView>> {
    let code = CouponCode::new(body.code).map_err(CouponError::from)?;
    let cart = s.backend.get_cart(customer.bearer()).await?;
    let subtotal = cart.subtotal()?;

    let coupon = s
        .backend
        .validate_coupon(customer.bearer(), &code, subtotal)
        .await?
        .ok_or_else(|| CouponError::NotFound(code.to_string()))?;
    coupon.check_applicable(Utc::now(), subtotal)?;

    let discount = coupon.discount_on(subtotal);
    s.sessions.apply_coupon(customer.key(), coupon).await;
    info!(%code, %discount, "coupon applied");
    s.events.publish(StorefrontEvent::CouponApplied { customer: customer.key().to_string(), code: code.to_string(), discount }).await;

    Ok(Json(view(&s, &customer, cart).await?))
}

pub async fn remove_coupon(State(s): State<AppState>, customer: Customer) -> Result<Json<CartView>> {
    if let Some(removed) = s.sessions.clear_coupon(customer.key()).await {
        s.events.publish(StorefrontEvent::CouponRemoved { customer: customer.key().to_string(), code: removed.code.to_string() }).await;
    }
    let cart = s.backend.get_cart(customer.bearer()).await?;
    Ok(Json(view(&s, &customer, cart).await?))
}
