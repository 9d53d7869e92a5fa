// src/models/review.rs

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A document in the 'reviews' collection. Reviews are append-only; there is
/// no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub user_id: String,
    pub property_id: String,

    /// 1 to 5, enforced at submission.
    pub rating: i32,

    /// Sanitized before storage.
    pub comment: String,

    pub created_at: mongodb::bson::DateTime,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: review.user_id,
            property_id: review.property_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_chrono(),
        }
    }
}

/// DTO for submitting a review.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub property_id: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    #[validate(length(min = 5, max = 2000, message = "Comment must be at least 5 characters."))]
    pub comment: String,
}
