use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use mongodb::bson::doc;
use serde_json::json;

use crate::{db, error::AppError, state::AppState, utils::jwt::CurrentUser};

/// List the current user's saved property ids.
pub async fn list_wishlist(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user.wishlist))
}

/// Save a property to the current user's wishlist.
///
/// Duplicate adds are rejected rather than silently ignored. The guard is in
/// the update filter itself, so two concurrent adds cannot both succeed.
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(property_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property_oid = db::parse_object_id(&property_id)?;

    // The listing must exist; a wishlist entry carries no ownership.
    db::properties(&state.db)
        .find_one(doc! { "_id": property_oid })
        .await?
        .ok_or(AppError::NotFound("Property not found".to_string()))?;

    let result = db::users(&state.db)
        .update_one(
            doc! { "_id": user.id, "wishlist": { "$ne": &property_id } },
            doc! { "$push": { "wishlist": &property_id } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::BadRequest(
            "Property already in wishlist".to_string(),
        ));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Property added to wishlist" })),
    ))
}

/// Remove a property from the current user's wishlist.
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(property_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = db::users(&state.db)
        .update_one(
            doc! { "_id": user.id },
            doc! { "$pull": { "wishlist": &property_id } },
        )
        .await?;

    if result.modified_count == 0 {
        return Err(AppError::NotFound("Wishlist item not found".to_string()));
    }

    Ok(Json(json!({ "removed": result.modified_count })))
}
