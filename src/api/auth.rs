use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::backend::Bearer;
use crate::StorefrontError;

/// Signed-in customer, taken from the `Authorization: Bearer` header.
///
/// The token is only ever forwarded to the backend. Sessions and events use
/// [`Customer::key`], a fingerprint of the token.
#[derive(Clone)]
pub struct Customer {
    token: String,
    key: String,
}

impl Customer {
    pub fn from_token(token: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        Self { token: token.to_string(), key: format!("{:016x}", hasher.finish()) }
    }

    pub fn bearer(&self) -> Bearer<'_> { Bearer(&self.token) }

    pub fn key(&self) -> &str { &self.key }
}

impl std::fmt::Debug for Customer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Customer").field("key", &self.key).finish_non_exhaustive()
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Customer {
    type Rejection = StorefrontError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(Customer::from_token)
            .ok_or(StorefrontError::Unauthorized)
    }
}
