//! Delivery addresses

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, Default, Serialize)]
pub struct Address {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

/// Address form submitted by a customer. Sent on to the backend in its camelCase shape.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct AddressInput {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[serde(rename(serialize = "addressLine1"))]
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    #[serde(default, rename(serialize = "addressLine2"))]
    #[validate(length(max = 200))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(custom = "validate_postal_code")]
    pub postal_code: String,
    #[validate(length(min = 2, max = 56))]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let allowed = phone.chars().all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if allowed && (7..=20).contains(&digits) { Ok(()) } else { Err(ValidationError::new("phone")) }
}

fn validate_postal_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    let allowed = code.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-');
    let significant = code.chars().filter(char::is_ascii_alphanumeric).count();
    if allowed && (3..=10).contains(&significant) { Ok(()) } else { Err(ValidationError::new("postal_code")) }
}
