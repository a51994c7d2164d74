//! Static informational pages.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::domain::pricing::PricingPolicy;
use crate::{AppState, Result, StorefrontError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InfoPage {
    pub slug: &'static str,
    pub title: &'static str,
    pub paragraphs: Vec<String>,
}

impl InfoPage {
    pub const SLUGS: [&'static str; 6] = ["about", "contact", "privacy", "terms", "shipping", "refunds"];

    /// Renders the page for `slug`; the shipping page quotes the live pricing policy.
    pub fn render(slug: &str, policy: &PricingPolicy) -> Option<Self> {
        let (slug, title, paragraphs): (&'static str, &'static str, Vec<String>) = match slug {
            "about" => ("about", "About Us", vec![
                "We are a neighbourhood bakery baking bread, cakes and pastries fresh every morning.".into(),
                "Everything on this site is made in our own kitchen, in small batches.".into(),
            ]),
            "contact" => ("contact", "Contact", vec![
                "Questions about an order? Reply to your order confirmation email and quote your order number.".into(),
                "For custom cakes and large orders, get in touch at least three days ahead.".into(),
            ]),
            "privacy" => ("privacy", "Privacy Policy", vec![
                "We keep your name, contact details and delivery addresses only to fulfil your orders.".into(),
                "Payment details are handled by our payment provider and never stored by the shop.".into(),
            ]),
            "terms" => ("terms", "Terms of Service", vec![
                "Prices include applicable taxes. Coupons cannot be combined and apply to the cart subtotal.".into(),
                "Orders are confirmed once the bakery accepts them; availability of fresh items may vary.".into(),
            ]),
            "shipping" => ("shipping", "Shipping", vec![
                format!(
                    "Orders over {} {} ship free. Smaller orders ship for a flat {} {}.",
                    policy.free_shipping_threshold, policy.currency, policy.flat_shipping_fee, policy.currency,
                ),
                "Orders placed before noon are usually delivered the same day.".into(),
            ]),
            "refunds" => ("refunds", "Refunds", vec![
                "If something arrives damaged or is not what you ordered, tell us within 24 hours for a refund or replacement.".into(),
                "Perishable goods cannot be returned once delivered in good condition.".into(),
            ]),
            _ => return None,
        };
        Some(Self { slug, title, paragraphs })
    }
}

pub async fn show(State(s): State<AppState>, Path(slug): Path<String>) -> Result<Json<InfoPage>> {
    InfoPage::render(&slug, &s.pricing).map(Json).ok_or_else(|| StorefrontError::NotFound(format!("page {slug}")))
}
