//! Cart Aggregate

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use crate::domain::value_objects::{Money, MoneyError};

/// Customer cart as held by the backend.
///
/// `server_total` is the subtotal the backend computed, when it sent one;
/// pricing prefers it over the local sum of lines.
#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    server_total: Option<Decimal>,
    currency: String,
}

/// One product/variant in the cart.
///
/// The backend may hold several lines for the same item; they are shown as one,
/// with `id` the first of them and `backend_ids` every one.
#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub id: String,
    #[serde(skip)]
    pub backend_ids: Vec<String>,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
    fn same_item(&self, other: &CartLine) -> bool { self.product_id == other.product_id && self.variant_id == other.variant_id }

    /// Whether `id` names this line or any backend line merged into it.
    pub fn answers_to(&self, id: &str) -> bool { self.id == id || self.backend_ids.iter().any(|b| b == id) }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { lines: vec![], server_total: None, currency: currency.to_string() }
    }

    /// Builds a cart from backend lines, merging duplicate product/variant entries.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>, server_total: Option<Decimal>, currency: &str) -> Self {
        let mut cart = Self::new(currency);
        for line in lines { cart.add_line(line); }
        cart.server_total = server_total;
        cart
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn server_total(&self) -> Option<Decimal> { self.server_total }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn line_count(&self) -> usize { self.lines.len() }
    pub fn item_count(&self) -> u32 { self.lines.iter().map(|l| l.quantity).sum() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn line(&self, line_id: &str) -> Result<&CartLine, CartError> {
        self.lines.iter().find(|l| l.answers_to(line_id)).ok_or_else(|| CartError::LineNotFound(line_id.to_string()))
    }

    pub fn add_line(&mut self, mut line: CartLine) {
        if !line.backend_ids.contains(&line.id) {
            line.backend_ids.insert(0, line.id.clone());
        }
        if let Some(existing) = self.lines.iter_mut().find(|l| l.same_item(&line)) {
            existing.quantity += line.quantity;
            for id in line.backend_ids {
                if !existing.backend_ids.contains(&id) {
                    existing.backend_ids.push(id);
                }
            }
        } else {
            self.lines.push(line);
        }
        // A local change invalidates whatever total the backend sent.
        self.server_total = None;
    }

    /// Local sum of unit price times quantity over all lines.
    pub fn local_subtotal(&self) -> Result<Money, MoneyError> {
        self.lines.iter().try_fold(Money::zero(&self.currency), |sum, l| sum.add(&l.line_total()))
    }

    /// Subtotal coupons are checked against: the backend's figure when present.
    pub fn subtotal(&self) -> Result<Decimal, MoneyError> {
        let subtotal = match self.server_total {
            Some(total) => total,
            None => self.local_subtotal()?.amount(),
        };
        Ok(subtotal.max(Decimal::ZERO))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart line {0} not found")]
    LineNotFound(String),
    #[error("cart is empty")]
    Empty,
}
