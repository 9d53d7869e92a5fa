use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, doc};
use serde_json::json;
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::review::{CreateReviewRequest, Review, ReviewResponse},
    state::AppState,
    utils::{html::clean_html, jwt::CurrentUser},
};

/// Submit a review for a property.
pub async fn create_review(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let property_oid = db::parse_object_id(&payload.property_id)?;

    db::properties(&state.db)
        .find_one(doc! { "_id": property_oid })
        .await?
        .ok_or(AppError::NotFound("Property not found".to_string()))?;

    let review = Review {
        id: None,
        user_id: user.id_string(),
        property_id: payload.property_id,
        rating: payload.rating,
        comment: clean_html(&payload.comment),
        created_at: DateTime::now(),
    };

    let result = db::reviews(&state.db).insert_one(&review).await?;
    let id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// List the reviews left on a property.
pub async fn list_property_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut cursor = db::reviews(&state.db)
        .find(doc! { "property_id": &id })
        .await?;

    let mut reviews = Vec::new();
    while let Some(review) = cursor.try_next().await? {
        reviews.push(ReviewResponse::from(review));
    }

    Ok(Json(reviews))
}

/// List the reviews the current user has written.
pub async fn list_my_reviews(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let mut cursor = db::reviews(&state.db)
        .find(doc! { "user_id": user.id_string() })
        .await?;

    let mut reviews = Vec::new();
    while let Some(review) = cursor.try_next().await? {
        reviews.push(ReviewResponse::from(review));
    }

    Ok(Json(reviews))
}
