use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::Customer;
use crate::domain::aggregates::{Cart, CartError, Coupon, Order, OrderRequest, PaymentMethod};
use crate::domain::events::StorefrontEvent;
use crate::domain::pricing::price_cart;
use crate::{AppState, Result, StorefrontError};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub note: Option<String>,
}

/// Re-checks the session coupon against the backend and the cart being ordered.
/// A coupon that no longer applies is dropped from the session.
async fn revalidate_coupon(state: &AppState, customer: &Customer, cart: &Cart) -> Result<Option<Coupon>> {
    let Some(held) = state.sessions.coupon(customer.key()).await else { return Ok(None) };
    let subtotal = cart.subtotal()?;

    let outcome = match state.backend.validate_coupon(customer.bearer(), &held.code, subtotal).await? {
        Some(fresh) => fresh.check_applicable(Utc::now(), subtotal).map(|()| fresh).map_err(|e| e.to_string()),
        None => Err(format!("coupon {} no longer exists", held.code)),
    };

    match outcome {
        Ok(fresh) => Ok(Some(fresh)),
        Err(reason) => {
            warn!(code = %held.code, %reason, "dropping coupon at checkout");
            state.sessions.clear_coupon(customer.key()).await;
            state.events.publish(StorefrontEvent::CouponRemoved { customer: customer.key().to_string(), code: held.code.to_string() }).await;
            Ok(None)
        }
    }
}

#[instrument(skip(s, customer, body), fields(payment = body.payment_method.as_str()))]
pub async fn place_order(State(s): State<AppState>, customer: Customer, Json(body): Json<CheckoutRequest>) -> Result<(StatusCode, Json<Order>)> {
    if body.address_id.trim().is_empty() {
        return Err(StorefrontError::InvalidInput("choose a delivery address".into()));
    }

    let cart = s.backend.get_cart(customer.bearer()).await?;
    if cart.is_empty() {
        return Err(CartError::Empty.into());
    }

    let coupon = revalidate_coupon(&s, &customer, &cart).await?;
    let totals = price_cart(&cart, coupon.as_ref(), &s.pricing)?;
    let request = OrderRequest::from_cart(&cart, &totals, body.address_id.trim(), body.payment_method, body.note)?;
    let order = s.backend.create_order(customer.bearer(), &request).await?;

    s.sessions.clear_coupon(customer.key()).await;
    info!(order_id = %order.id, total = %order.total, "order placed");
    s.events
        .publish(StorefrontEvent::OrderPlaced {
            customer: customer.key().to_string(),
            order_id: order.id.clone(),
            total: order.total.amount(),
            currency: order.total.currency().to_string(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(State(s): State<AppState>, customer: Customer) -> Result<Json<Vec<Order>>> {
    Ok(Json(s.backend.list_orders(customer.bearer()).await?))
}

pub async fn get_order(State(s): State<AppState>, customer: Customer, Path(id): Path<String>) -> Result<Json<Order>> {
    Ok(Json(s.backend.get_order(customer.bearer(), &id).await?))
}
