use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::backend::BackendError;
use crate::domain::aggregates::{CartError, CouponError};
use crate::StorefrontError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl StorefrontError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::Quantity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Cart(CartError::LineNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::Empty) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Coupon(CouponError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Coupon(CouponError::InvalidCode(_)) => StatusCode::BAD_REQUEST,
            Self::Coupon(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Money(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(e) => match e.status() {
                Some(status) if status.is_client_error() => status,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Quantity(_) => "INVALID_QUANTITY",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Cart(CartError::LineNotFound(_)) => "CART_LINE_NOT_FOUND",
            Self::Cart(CartError::Empty) => "EMPTY_CART",
            Self::Coupon(CouponError::NotFound(_)) => "COUPON_NOT_FOUND",
            Self::Coupon(CouponError::InvalidCode(_)) => "INVALID_COUPON_CODE",
            Self::Coupon(_) => "COUPON_NOT_APPLICABLE",
            Self::Money(_) => "PRICING_ERROR",
            Self::Backend(e) => match e.status() {
                Some(StatusCode::UNAUTHORIZED) => "UNAUTHORIZED",
                Some(StatusCode::FORBIDDEN) => "FORBIDDEN",
                Some(StatusCode::NOT_FOUND) => "NOT_FOUND",
                Some(StatusCode::CONFLICT) => "CONFLICT",
                Some(status) if status.is_client_error() => "REJECTED",
                _ => "BACKEND_UNAVAILABLE",
            },
        }
    }

    /// Message safe to show a customer. Backend 4xx messages pass through; anything else is generic.
    fn public_message(&self) -> String {
        match self {
            Self::Backend(BackendError::Status { status, message }) if status.is_client_error() => message.clone(),
            Self::Backend(_) => "The bakery is not answering right now, please try again shortly".to_string(),
            Self::Validation(_) => "Some fields are invalid".to_string(),
            Self::Money(_) => "Your cart could not be priced, please try again shortly".to_string(),
            other => other.to_string(),
        }
    }

    fn field_errors(&self) -> BTreeMap<String, Vec<String>> {
        let Self::Validation(errors) = self else { return BTreeMap::new() };
        errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs.iter().map(|e| e.code.to_string()).collect()))
            .collect()
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = ErrorBody { code: self.error_code(), message: self.public_message(), fields: self.field_errors() };
        (status, Json(body)).into_response()
    }
}
