//! Product reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, Serialize)]
pub struct Review {
    pub id: String,
    pub product_id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct ReviewInput {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean rating to one decimal place; zero when there are no reviews.
    pub average: f32,
    pub count: usize,
    /// Review counts for ratings 1 through 5.
    pub distribution: [usize; 5],
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut distribution = [0usize; 5];
        let mut sum = 0u32;
        let mut count = 0usize;
        for review in reviews.iter().filter(|r| (1..=5).contains(&r.rating)) {
            distribution[usize::from(review.rating - 1)] += 1;
            sum += u32::from(review.rating);
            count += 1;
        }
        let average = if count == 0 { 0.0 } else { ((sum as f32 / count as f32) * 10.0).round() / 10.0 };
        Self { average, count, distribution }
    }
}
