//! Cart pricing.
//!
//! Pure and synchronous: the same cart, coupon and policy always price to the
//! same totals.
//!
//! - subtotal: the backend's cart total when it sent one, else the sum of
//!   `unit_price * quantity` over the lines
//! - discount: `subtotal * pct / 100` for percentage coupons, `min(amount, subtotal)`
//!   for fixed-amount coupons
//! - shipping: free when the subtotal is strictly above the threshold, flat fee otherwise
//! - free shipping remaining: the smallest amount, in cents, that lifts the
//!   subtotal above the threshold; one cent at exactly the threshold
//! - grand total: `subtotal - discount + shipping`

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use crate::domain::aggregates::{Cart, Coupon, DiscountKind};
use crate::domain::value_objects::{round_cents, CouponCode, Money, MoneyError};

/// Store-wide shipping rules and currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingPolicy {
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
    pub currency: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self { free_shipping_threshold: Decimal::new(5000, 2), flat_shipping_fee: Decimal::new(499, 2), currency: "USD".to_string() }
    }
}

impl PricingPolicy {
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_threshold { Decimal::ZERO } else { self.flat_shipping_fee }
    }

    /// Smallest whole-cent spend that makes shipping free; zero when it already is.
    pub fn free_shipping_remaining(&self, subtotal: Decimal) -> Decimal {
        if self.shipping_for(subtotal).is_zero() {
            return Decimal::ZERO;
        }
        let gap = (self.free_shipping_threshold - subtotal).max(Decimal::ZERO);
        gap.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity) + Decimal::new(1, 2)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub grand_total: Money,
    /// How much more the customer must spend to ship for free; zero once shipping is free.
    pub free_shipping_remaining: Money,
    pub applied_coupon: Option<CouponCode>,
}

/// Discount a coupon of `kind` and `magnitude` takes off `subtotal`, rounded to cents.
///
/// Never exceeds the subtotal and is never negative.
pub fn coupon_discount(kind: DiscountKind, magnitude: Decimal, subtotal: Decimal) -> Decimal {
    let subtotal = subtotal.max(Decimal::ZERO);
    let magnitude = magnitude.max(Decimal::ZERO);
    let raw = match kind {
        DiscountKind::Percentage => subtotal * magnitude.min(Decimal::ONE_HUNDRED) / Decimal::ONE_HUNDRED,
        DiscountKind::FixedAmount => magnitude.min(subtotal),
    };
    round_cents(raw).min(subtotal)
}

/// Prices a set of lines.
///
/// `server_subtotal` wins over the local sum of lines when present.
pub fn price_lines(
    local_subtotal: Decimal,
    server_subtotal: Option<Decimal>,
    coupon: Option<&Coupon>,
    policy: &PricingPolicy,
) -> CartTotals {
    let currency = policy.currency.as_str();
    let subtotal = server_subtotal.unwrap_or(local_subtotal).max(Decimal::ZERO);
    let discount = coupon.map_or(Decimal::ZERO, |c| c.discount_on(subtotal));
    let shipping = policy.shipping_for(subtotal);
    let remaining = policy.free_shipping_remaining(subtotal);
    let grand_total = subtotal - discount + shipping;

    CartTotals {
        subtotal: Money::new(subtotal, currency),
        discount: Money::new(discount, currency),
        shipping: Money::new(shipping, currency),
        grand_total: Money::new(grand_total, currency),
        free_shipping_remaining: Money::new(remaining, currency),
        applied_coupon: coupon.map(|c| c.code.clone()),
    }
}

/// Prices a cart as the backend holds it.
///
/// Fails only when the cart's lines are priced in different currencies.
pub fn price_cart(cart: &Cart, coupon: Option<&Coupon>, policy: &PricingPolicy) -> Result<CartTotals, MoneyError> {
    let local = match cart.server_total() {
        Some(_) => Decimal::ZERO,
        None => cart.local_subtotal()?.amount(),
    };
    Ok(price_lines(local, cart.server_total(), coupon, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartLine;
    use rstest::rstest;

    fn d(cents: i64) -> Decimal { Decimal::new(cents, 2) }

    fn coupon(kind: DiscountKind, magnitude: Decimal) -> Coupon {
        Coupon {
            code: CouponCode::new("SWEET").unwrap(), kind, magnitude, description: None,
            min_order: None, valid_from: None, valid_until: None, active: true,
        }
    }

    fn cart(lines: &[(i64, u32)], server_total: Option<Decimal>) -> Cart {
        Cart::from_lines(
            lines.iter().enumerate().map(|(i, (cents, qty))| CartLine {
                id: format!("L{i}"), backend_ids: vec![format!("L{i}")], product_id: format!("P{i}"), variant_id: None, name: "Bun".into(),
                image: None, unit_price: Money::usd(d(*cents)), quantity: *qty,
            }),
            server_total,
            "USD",
        )
    }

    #[rstest]
    #[case::ten_percent(DiscountKind::Percentage, d(1000), d(4000), d(400))]
    #[case::over_hundred_percent(DiscountKind::Percentage, d(15000), d(4000), d(4000))]
    #[case::negative_percent(DiscountKind::Percentage, d(-500), d(4000), d(0))]
    #[case::rounds_midpoint_up(DiscountKind::Percentage, d(1500), d(1010), d(152))]
    #[case::fixed_below_subtotal(DiscountKind::FixedAmount, d(500), d(4000), d(500))]
    #[case::fixed_capped(DiscountKind::FixedAmount, d(5000), d(1250), d(1250))]
    #[case::empty_cart(DiscountKind::FixedAmount, d(500), d(0), d(0))]
    fn test_coupon_discount(#[case] kind: DiscountKind, #[case] magnitude: Decimal, #[case] subtotal: Decimal, #[case] expected: Decimal) {
        assert_eq!(coupon_discount(kind, magnitude, subtotal), expected);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let totals = price_cart(&cart(&[(350, 2), (1200, 1)], None), None, &PricingPolicy::default()).unwrap();
        assert_eq!(totals.subtotal.amount(), d(1900));
        assert_eq!(totals.discount.amount(), d(0));
        assert_eq!(totals.shipping.amount(), d(499));
        assert_eq!(totals.grand_total.amount(), d(2399));
        assert_eq!(totals.free_shipping_remaining.amount(), d(3101));
        assert_eq!(totals.applied_coupon, None);
    }

    #[test]
    fn test_server_total_preferred() {
        let totals = price_cart(&cart(&[(350, 2)], Some(d(6000))), None, &PricingPolicy::default()).unwrap();
        assert_eq!(totals.subtotal.amount(), d(6000));
        assert!(totals.shipping.is_zero());
        assert!(totals.free_shipping_remaining.is_zero());
        assert_eq!(totals.grand_total.amount(), d(6000));
    }

    #[rstest]
    #[case::below(d(4999), d(499), d(2))]
    #[case::at_threshold(d(5000), d(499), d(1))]
    #[case::above(d(5001), d(0), d(0))]
    #[case::fractional_cent_below(Decimal::new(49995, 3), d(499), d(1))]
    fn test_shipping_threshold_is_strict(#[case] subtotal: Decimal, #[case] shipping: Decimal, #[case] remaining: Decimal) {
        let policy = PricingPolicy::default();
        assert_eq!(policy.shipping_for(subtotal), shipping);
        assert_eq!(policy.free_shipping_remaining(subtotal), remaining);
        assert_eq!(policy.shipping_for(subtotal + remaining), Decimal::ZERO);
    }

    #[test]
    fn test_no_remaining_when_shipping_is_free_anyway() {
        let policy = PricingPolicy { flat_shipping_fee: Decimal::ZERO, ..PricingPolicy::default() };
        assert_eq!(policy.free_shipping_remaining(d(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_shipping_uses_pre_discount_subtotal() {
        let c = coupon(DiscountKind::Percentage, d(2000));
        let totals = price_lines(d(6000), None, Some(&c), &PricingPolicy::default());
        assert_eq!(totals.discount.amount(), d(1200));
        assert!(totals.shipping.is_zero());
        assert_eq!(totals.grand_total.amount(), d(4800));
        assert_eq!(totals.applied_coupon.unwrap().as_str(), "SWEET");
    }

    #[test]
    fn test_fixed_coupon_never_goes_negative() {
        let c = coupon(DiscountKind::FixedAmount, d(10000));
        let totals = price_lines(d(800), None, Some(&c), &PricingPolicy::default());
        assert_eq!(totals.discount.amount(), d(800));
        assert_eq!(totals.grand_total.amount(), d(499));
    }

    #[test]
    fn test_pricing_is_idempotent() {
        let c = coupon(DiscountKind::Percentage, d(1250));
        let cart = cart(&[(275, 3), (1899, 2)], None);
        let policy = PricingPolicy { currency: "EUR".into(), ..PricingPolicy::default() };
        let first = price_cart(&cart, Some(&c), &policy).unwrap();
        assert_eq!(first, price_cart(&cart, Some(&c), &policy).unwrap());
        assert_eq!(first.grand_total.currency(), "EUR");
    }
}
