//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{Address, Cart, CartError};
use crate::domain::pricing::CartTotals;
use crate::domain::value_objects::{CouponCode, Money};

#[derive(Clone, Debug, Serialize)]
pub struct Order {
    pub id: String,
    pub number: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub total: Money,
    pub coupon_code: Option<String>,
    pub payment_method: Option<String>,
    pub address: Option<Address>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)] pub struct LineItem { pub product_id: String, pub variant_id: Option<String>, pub name: String, pub quantity: u32, pub unit_price: Money, pub total: Money }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { #[default] Pending, Confirmed, Processing, Shipped, Delivered, Cancelled }

impl OrderStatus {
    /// Parses the backend's status string; anything unrecognized reads as pending.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "confirmed" | "placed" => Self::Confirmed,
            "processing" | "baking" | "packed" => Self::Processing,
            "shipped" | "out_for_delivery" | "out for delivery" => Self::Shipped,
            "delivered" | "completed" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod { CashOnDelivery, Card, Upi }

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self { Self::CashOnDelivery => "cash_on_delivery", Self::Card => "card", Self::Upi => "upi" }
    }
}

/// Order the storefront submits to the backend at checkout.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderRequestItem>,
    pub address_id: String,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<CouponCode>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequestItem {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderRequest {
    pub fn from_cart(cart: &Cart, totals: &CartTotals, address_id: impl Into<String>, payment_method: PaymentMethod, note: Option<String>) -> Result<Self, CartError> {
        if cart.is_empty() { return Err(CartError::Empty); }
        Ok(Self {
            items: cart.lines().iter().map(|l| OrderRequestItem {
                product_id: l.product_id.clone(), variant_id: l.variant_id.clone(), quantity: l.quantity, price: l.unit_price.amount(),
            }).collect(),
            address_id: address_id.into(),
            payment_method,
            coupon_code: totals.applied_coupon.clone(),
            subtotal: totals.subtotal.amount(),
            discount: totals.discount.amount(),
            shipping: totals.shipping.amount(),
            total: totals.grand_total.amount(),
            currency: totals.grand_total.currency().to_string(),
            note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        })
    }
}
