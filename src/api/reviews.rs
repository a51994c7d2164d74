use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use super::Customer;
use crate::domain::aggregates::{RatingSummary, Review, ReviewInput};
use crate::domain::events::StorefrontEvent;
use crate::{AppState, Result};

#[derive(Debug, Serialize)]
pub struct ProductReviews {
    pub summary: RatingSummary,
    pub reviews: Vec<Review>,
}

pub async fn list_reviews(State(s): State<AppState>, Path(product_id): Path<String>) -> Result<Json<ProductReviews>> {
    let reviews = s.backend.list_reviews(&product_id).await?;
    Ok(Json(ProductReviews { summary: RatingSummary::from_reviews(&reviews), reviews }))
}

pub async fn create_review(
    State(s): State<AppState>,
    customer: Customer,
    Path(product_id): Path<String>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<Review>)> {
    input.validate()?;
    let review = s.backend.create_review(customer.bearer(), &product_id, &input).await?;
    s.events
        .publish(StorefrontEvent::ReviewSubmitted { customer: customer.key().to_string(), product_id, rating: input.rating })
        .await;
    Ok((StatusCode::CREATED, Json(review)))
}
