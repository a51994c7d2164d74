//! Customer account, sign-in and wishlist

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::Product;

#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Token issued by the backend plus the customer it belongs to.
#[derive(Clone, Debug, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub user: Profile,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Wishlist { pub items: Vec<Product> }

impl Wishlist {
    pub fn contains(&self, product_id: &str) -> bool { self.items.iter().any(|p| p.id == product_id) }
}

/// Outcome of toggling a product on the wishlist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WishlistToggle { pub product_id: String, pub in_wishlist: bool }
