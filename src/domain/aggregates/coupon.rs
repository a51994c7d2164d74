//! Coupon Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::pricing;
use crate::domain::value_objects::{CouponCode, CouponCodeError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind { Percentage, FixedAmount }

#[derive(Clone, Debug, Serialize)]
pub struct Coupon {
    pub code: CouponCode,
    pub kind: DiscountKind,
    pub magnitude: Decimal,
    pub description: Option<String>,
    pub min_order: Option<Decimal>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Coupon {
    pub fn discount_on(&self, subtotal: Decimal) -> Decimal { pricing::coupon_discount(self.kind, self.magnitude, subtotal) }

    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.active && self.valid_from.map_or(true, |from| now >= from) && self.valid_until.map_or(true, |until| now <= until)
    }

    /// Checks the coupon may be applied to a cart with the given subtotal at `now`.
    pub fn check_applicable(&self, now: DateTime<Utc>, subtotal: Decimal) -> Result<(), CouponError> {
        let code = self.code.to_string();
        if !self.active { return Err(CouponError::Inactive(code)); }
        if let Some(from) = self.valid_from.filter(|from| now < *from) {
            return Err(CouponError::NotYetValid { code, starts_at: from });
        }
        if let Some(until) = self.valid_until.filter(|until| now > *until) {
            return Err(CouponError::Expired { code, ended_at: until });
        }
        if let Some(minimum) = self.min_order.filter(|min| subtotal < *min) {
            return Err(CouponError::BelowMinimum { code, minimum });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("coupon {0} does not exist")]
    NotFound(String),
    #[error("coupon {0} is no longer active")]
    Inactive(String),
    #[error("coupon {code} is valid from {starts_at}")]
    NotYetValid { code: String, starts_at: DateTime<Utc> },
    #[error("coupon {code} expired on {ended_at}")]
    Expired { code: String, ended_at: DateTime<Utc> },
    #[error("coupon {code} needs a subtotal of at least {minimum}")]
    BelowMinimum { code: String, minimum: Decimal },
    #[error(transparent)]
    InvalidCode(#[from] CouponCodeError),
}
