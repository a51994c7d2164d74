//! Backend payload shapes and their conversion into the domain model.
//!
//! The backend is loose about naming: ids arrive as `id` or `_id`, strings or
//! numbers; several fields have two or three historical names. Every wire
//! struct accepts all of them and the `into_*` conversions pick the first
//! one present.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{
    Address, Cart, CartLine, Category, Coupon, DiscountKind, LineItem, Order, OrderStatus, Product, Profile, Review,
    SignedIn, Variant,
};
use crate::domain::value_objects::{CouponCode, Money};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdRepr {
    Text(String),
    Number(i64),
}

impl From<IdRepr> for String {
    fn from(id: IdRepr) -> Self {
        match id {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Ident {
    #[serde(default)]
    id: Option<IdRepr>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<IdRepr>,
}

impl Ident {
    fn resolve(self) -> Option<String> { self.id.or(self.mongo_id).map(String::from) }
}

/// Parses RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|t| t.and_utc()))
}

fn slugify(name: &str) -> String { name.trim().to_lowercase().replace(' ', "-") }

fn non_empty(s: Option<String>) -> Option<String> { s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) }

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    #[serde(flatten)]
    ident: Ident,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    compare_at_price: Option<Decimal>,
    #[serde(default)]
    original_price: Option<Decimal>,
    #[serde(default)]
    category: Option<CategoryRef>,
    #[serde(default)]
    images: Vec<ImageRef>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    variants: Vec<WireVariant>,
    #[serde(default)]
    in_stock: Option<bool>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    count_in_stock: Option<i64>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    average_rating: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Embedded(WireCategory),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Object { url: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVariant {
    #[serde(flatten)]
    ident: Ident,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    in_stock: Option<bool>,
    #[serde(default)]
    stock: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCategory {
    #[serde(flatten)]
    ident: Ident,
    name: String,
    #[serde(default)]
    slug: Option<String>,
}

fn stock_flag(flag: Option<bool>, counts: [Option<i64>; 2]) -> bool {
    flag.or_else(|| counts.into_iter().flatten().next().map(|n| n > 0)).unwrap_or(true)
}

impl WireProduct {
    pub fn id(&self) -> Option<String> { self.ident.id.clone().or_else(|| self.ident.mongo_id.clone()).map(String::from) }

    pub fn into_product(self, currency: &str) -> Product {
        let id = self.id().unwrap_or_default();
        let name = non_empty(self.name).or(non_empty(self.title)).unwrap_or_default();
        let mut images: Vec<String> = self.images.into_iter().map(|i| match i { ImageRef::Url(u) | ImageRef::Object { url: u } => u }).collect();
        if let Some(image) = non_empty(self.image).filter(|i| !images.contains(i)) { images.insert(0, image); }
        Product {
            id,
            slug: non_empty(self.slug),
            description: self.description.unwrap_or_default(),
            price: Money::new(self.price.unwrap_or_default(), currency),
            compare_at_price: self.compare_at_price.or(self.original_price).map(|p| Money::new(p, currency)),
            category: self.category.and_then(|c| c.into_category()),
            images,
            variants: self.variants.into_iter().map(|v| v.into_variant(currency)).collect(),
            in_stock: stock_flag(self.in_stock, [self.stock, self.count_in_stock]),
            rating: self.average_rating.or(self.rating),
            name,
        }
    }
}

impl WireVariant {
    pub fn into_variant(self, currency: &str) -> Variant {
        let name = non_empty(self.name).or(non_empty(self.size)).unwrap_or_default();
        Variant {
            id: self.ident.resolve().unwrap_or_else(|| slugify(&name)),
            price: self.price.map(|p| Money::new(p, currency)),
            in_stock: stock_flag(self.in_stock, [self.stock, None]),
            name,
        }
    }
}

impl CategoryRef {
    fn into_category(self) -> Option<Category> {
        match self {
            Self::Embedded(c) => Some(c.into_category()),
            Self::Name(name) => non_empty(Some(name)).map(|name| Category { id: slugify(&name), slug: slugify(&name), name }),
        }
    }
}

impl WireCategory {
    pub fn into_category(self) -> Category {
        let slug = non_empty(self.slug).unwrap_or_else(|| slugify(&self.name));
        Category { id: self.ident.resolve().unwrap_or_else(|| slug.clone()), slug, name: self.name }
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCart {
    #[serde(default)]
    items: Vec<WireCartItem>,
    #[serde(default)]
    cart_items: Vec<WireCartItem>,
    #[serde(default)]
    subtotal: Option<Decimal>,
    #[serde(default)]
    total_price: Option<Decimal>,
    #[serde(default)]
    total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Embedded(Box<WireProduct>),
    Id(IdRepr),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VariantRef {
    Embedded(WireVariant),
    Id(IdRepr),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCartItem {
    #[serde(flatten)]
    ident: Ident,
    #[serde(default)]
    product: Option<ProductRef>,
    #[serde(default)]
    product_id: Option<IdRepr>,
    #[serde(default)]
    variant: Option<VariantRef>,
    #[serde(default)]
    variant_id: Option<IdRepr>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default = "one")]
    quantity: u32,
}

fn one() -> u32 { 1 }

impl WireCart {
    pub fn into_cart(self, currency: &str) -> Cart {
        let server_total = self.subtotal.or(self.total_price).or(self.total);
        let lines = self.items.into_iter().chain(self.cart_items).filter_map(|i| i.into_line(currency));
        Cart::from_lines(lines, server_total, currency)
    }
}

impl WireCartItem {
    /// Lines without any product reference are dropped.
    fn into_line(self, currency: &str) -> Option<CartLine> {
        let (product, product_ref_id) = match self.product {
            Some(ProductRef::Embedded(p)) => {
                let id = p.id();
                (Some(p.into_product(currency)), id)
            }
            Some(ProductRef::Id(id)) => (None, Some(String::from(id))),
            None => (None, None),
        };
        let product_id = product_ref_id.or(self.product_id.map(String::from))?;
        let (variant_id, variant_price) = match self.variant {
            Some(VariantRef::Embedded(v)) => {
                let v = v.into_variant(currency);
                (Some(v.id), v.price)
            }
            Some(VariantRef::Id(id)) => (Some(String::from(id)), None),
            None => (self.variant_id.map(String::from), None),
        };
        let unit_price = self
            .price
            .map(|p| Money::new(p, currency))
            .or(variant_price)
            .or_else(|| product.as_ref().map(|p| p.unit_price(variant_id.as_deref())))
            .unwrap_or_else(|| Money::zero(currency));
        let id = self.ident.resolve().unwrap_or_else(|| match &variant_id {
            Some(v) => format!("{product_id}:{v}"),
            None => product_id.clone(),
        });
        Some(CartLine {
            backend_ids: vec![id.clone()],
            id,
            name: non_empty(self.name).or_else(|| product.as_ref().map(|p| p.name.clone())).unwrap_or_default(),
            image: non_empty(self.image).or_else(|| product.as_ref().and_then(|p| p.images.first().cloned())),
            product_id,
            variant_id,
            unit_price,
            quantity: self.quantity,
        })
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// Body of a coupon validation request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCheck<'a> {
    pub code: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub cart_total: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCoupon {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    discount_type: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    discount_value: Option<Decimal>,
    #[serde(default)]
    value: Option<Decimal>,
    #[serde(default)]
    discount: Option<Decimal>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    min_order_amount: Option<Decimal>,
    #[serde(default)]
    min_order: Option<Decimal>,
    #[serde(default)]
    valid_from: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    valid_until: Option<String>,
    #[serde(default)]
    expiry_date: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    active: Option<bool>,
}

pub fn parse_discount_kind(raw: &str) -> Option<DiscountKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "percentage" | "percent" | "%" => Some(DiscountKind::Percentage),
        "fixed" | "flat" | "amount" | "fixed_amount" | "fixedamount" => Some(DiscountKind::FixedAmount),
        _ => None,
    }
}

impl WireCoupon {
    pub fn into_coupon(self) -> Result<Coupon, String> {
        let code = self.code.ok_or("coupon has no code")?;
        let code = CouponCode::new(code).map_err(|e| e.to_string())?;
        let raw_kind = self.discount_type.or(self.kind).unwrap_or_default();
        let kind = parse_discount_kind(&raw_kind).ok_or_else(|| format!("coupon {code} has unknown discount type '{raw_kind}'"))?;
        let magnitude = self.discount_value.or(self.value).or(self.discount).ok_or_else(|| format!("coupon {code} has no discount value"))?;
        let when = |a: Option<String>, b: Option<String>, c: Option<String>| a.or(b).or(c).as_deref().and_then(parse_timestamp);
        Ok(Coupon {
            kind,
            magnitude,
            description: non_empty(self.description),
            min_order: self.min_order_amount.or(self.min_order).filter(|m| !m.is_zero()),
            valid_from: when(self.valid_from, self.start_date, None),
            valid_until: when(self.valid_until, self.expiry_date, self.expires_at),
            active: self.is_active.or(self.active).unwrap_or(true),
            code,
        })
    }
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAddress {
    #[serde(flatten)]
    ident: Ident,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address_line1: Option<String>,
    #[serde(default)]
    line1: Option<String>,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    address_line2: Option<String>,
    #[serde(default)]
    line2: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    pincode: Option<String>,
    #[serde(default)]
    zip: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    is_default: Option<bool>,
}

impl WireAddress {
    pub fn into_address(self) -> Address {
        Address {
            id: self.ident.resolve().unwrap_or_default(),
            full_name: non_empty(self.full_name).or(non_empty(self.name)).unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            line1: non_empty(self.address_line1).or(non_empty(self.line1)).or(non_empty(self.street)).unwrap_or_default(),
            line2: non_empty(self.address_line2).or(non_empty(self.line2)),
            city: self.city.unwrap_or_default(),
            state: non_empty(self.state),
            postal_code: non_empty(self.postal_code).or(non_empty(self.pincode)).or(non_empty(self.zip)).unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            is_default: self.is_default.unwrap_or(false),
        }
    }
}

// =============================================================================
// Reviews
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Embedded(WireUser),
    /// Unpopulated reference; the author's name is not available.
    Id(#[allow(dead_code)] IdRepr),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReview {
    #[serde(flatten)]
    ident: Ident,
    #[serde(default)]
    product: Option<IdRepr>,
    #[serde(default)]
    product_id: Option<IdRepr>,
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl WireReview {
    pub fn into_review(self, product_id: &str) -> Review {
        let author = non_empty(self.name)
            .or(match self.user {
                Some(UserRef::Embedded(u)) => non_empty(u.name),
                Some(UserRef::Id(_)) | None => None,
            })
            .unwrap_or_else(|| "Anonymous".to_string());
        Review {
            id: self.ident.resolve().unwrap_or_default(),
            product_id: self.product.or(self.product_id).map(String::from).unwrap_or_else(|| product_id.to_string()),
            author,
            rating: self.rating.round().clamp(0.0, 5.0) as u8,
            comment: non_empty(self.comment).or(non_empty(self.text)).unwrap_or_default(),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    #[serde(flatten)]
    ident: Ident,
    #[serde(default)]
    order_number: Option<IdRepr>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    order_status: Option<String>,
    #[serde(default)]
    items: Vec<WireOrderItem>,
    #[serde(default)]
    order_items: Vec<WireOrderItem>,
    #[serde(default)]
    subtotal: Option<Decimal>,
    #[serde(default)]
    items_price: Option<Decimal>,
    #[serde(default)]
    discount: Option<Decimal>,
    #[serde(default)]
    shipping: Option<Decimal>,
    #[serde(default)]
    shipping_price: Option<Decimal>,
    #[serde(default)]
    total: Option<Decimal>,
    #[serde(default)]
    total_price: Option<Decimal>,
    #[serde(default)]
    coupon_code: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    shipping_address: Option<WireAddress>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrderItem {
    #[serde(default)]
    product: Option<ProductRef>,
    #[serde(default)]
    product_id: Option<IdRepr>,
    #[serde(default)]
    variant_id: Option<IdRepr>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "one")]
    quantity: u32,
    #[serde(default)]
    price: Option<Decimal>,
}

impl WireOrder {
    pub fn into_order(self, currency: &str) -> Order {
        let items: Vec<LineItem> = self.items.into_iter().chain(self.order_items).map(|i| i.into_line_item(currency)).collect();
        let money = |d: Decimal| Money::new(d, currency);
        let subtotal = self.subtotal.or(self.items_price).unwrap_or_else(|| items.iter().map(|i| i.total.amount()).sum());
        let discount = self.discount.unwrap_or_default();
        let shipping = self.shipping.or(self.shipping_price).unwrap_or_default();
        let total = self.total.or(self.total_price).unwrap_or(subtotal - discount + shipping);
        Order {
            id: self.ident.resolve().unwrap_or_default(),
            number: self.order_number.map(String::from),
            status: self.status.or(self.order_status).as_deref().map(OrderStatus::parse).unwrap_or_default(),
            items,
            subtotal: money(subtotal),
            discount: money(discount),
            shipping: money(shipping),
            total: money(total),
            coupon_code: non_empty(self.coupon_code),
            payment_method: non_empty(self.payment_method),
            address: self.shipping_address.map(WireAddress::into_address),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

impl WireOrderItem {
    fn into_line_item(self, currency: &str) -> LineItem {
        let (product, ref_id) = match self.product {
            Some(ProductRef::Embedded(p)) => {
                let id = p.id();
                (Some(p.into_product(currency)), id)
            }
            Some(ProductRef::Id(id)) => (None, Some(String::from(id))),
            None => (None, None),
        };
        let unit_price = self.price.map(|p| Money::new(p, currency)).or_else(|| product.as_ref().map(|p| p.price.clone())).unwrap_or_else(|| Money::zero(currency));
        LineItem {
            product_id: ref_id.or(self.product_id.map(String::from)).unwrap_or_default(),
            variant_id: self.variant_id.map(String::from),
            name: non_empty(self.name).or_else(|| product.map(|p| p.name)).unwrap_or_default(),
            quantity: self.quantity,
            total: unit_price.multiply(self.quantity),
            unit_price,
        }
    }
}

// =============================================================================
// Account
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUser {
    #[serde(flatten)]
    ident: Ident,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

impl WireUser {
    pub fn into_profile(self) -> Profile {
        Profile {
            id: self.ident.resolve().unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: non_empty(self.phone),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAuth {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
}

impl WireAuth {
    pub fn into_signed_in(self) -> Result<SignedIn, String> {
        let token = non_empty(self.token).or(non_empty(self.access_token)).ok_or("sign-in response carried no token")?;
        Ok(SignedIn { token, user: self.user.unwrap_or_default().into_profile() })
    }
}

/// Wishlist entries arrive either as products or as `{ product: .. }` records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WishlistEntry {
    Wrapped { product: Box<WireProduct> },
    Product(Box<WireProduct>),
}

impl WishlistEntry {
    pub fn into_product(self, currency: &str) -> Product {
        match self {
            Self::Wrapped { product } | Self::Product(product) => product.into_product(currency),
        }
    }
}
