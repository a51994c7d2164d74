//! Catalog read model

use serde::Serialize;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub category: Option<Category>,
    pub images: Vec<String>,
    pub variants: Vec<Variant>,
    pub in_stock: bool,
    pub rating: Option<f32>,
}

#[derive(Clone, Debug, Serialize)] pub struct Variant { pub id: String, pub name: String, pub price: Option<Money>, pub in_stock: bool }
#[derive(Clone, Debug, Serialize)] pub struct Category { pub id: String, pub name: String, pub slug: String }

impl Product {
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> { self.variants.iter().find(|v| v.id == variant_id) }

    /// Price charged for one unit of the product, or of a specific variant of it.
    pub fn unit_price(&self, variant_id: Option<&str>) -> Money {
        variant_id
            .and_then(|id| self.variant(id))
            .and_then(|v| v.price.clone())
            .unwrap_or_else(|| self.price.clone())
    }
}

/// One page of catalog results.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> { pub items: Vec<T>, pub total: u64, pub page: u32, pub per_page: u32 }

/// Listing filters, normalized to the bounds the storefront serves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductQuery { pub page: u32, pub per_page: u32, pub category: Option<String>, pub search: Option<String> }

impl ProductQuery {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const MAX_PER_PAGE: u32 = 100;

    pub fn new(page: Option<u32>, per_page: Option<u32>, category: Option<String>, search: Option<String>) -> Self {
        let non_blank = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(Self::DEFAULT_PER_PAGE).clamp(1, Self::MAX_PER_PAGE),
            category: non_blank(category),
            search: non_blank(search),
        }
    }
}
