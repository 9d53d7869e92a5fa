use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use serde_json::json;
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::user::{UpdateProfileRequest, UserResponse},
    state::AppState,
    storage::{self, PRESIGN_TTL_SECS},
    utils::jwt::CurrentUser,
};

/// Get the current user's profile.
pub async fn get_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(UserResponse::from(user)))
}

/// List all registered users.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut cursor = db::users(&state.db).find(doc! {}).await?;

    let mut users = Vec::new();
    while let Some(user) = cursor.try_next().await? {
        users.push(UserResponse::from(user));
    }

    Ok(Json(users))
}

/// Get a single user by id.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oid = db::parse_object_id(&id)?;

    let user = db::users(&state.db)
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Partial profile update: only supplied fields (name, phone number) change.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut set = doc! {};
    if let Some(name) = &payload.name {
        set.insert("name", name);
    }
    if let Some(phone_number) = &payload.phone_number {
        set.insert("phone_number", phone_number);
    }

    if set.is_empty() {
        return Ok(StatusCode::NO_CONTENT);
    }

    let result = db::users(&state.db)
        .update_one(doc! { "_id": user.id }, doc! { "$set": set })
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Upload (or replace) the current user's profile picture.
pub async fn upload_my_picture(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // 1. Pull the first file field out of the form.
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.file_name().is_some() {
            let filename = field.file_name().unwrap_or("picture").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some((filename, content_type, bytes.to_vec()));
            break;
        }
    }

    let (filename, content_type, bytes) =
        upload.ok_or(AppError::BadRequest("No file supplied".to_string()))?;

    // 2. Replacing: the previous object is removed first, best-effort.
    if let Some(old_key) = &user.profile_picture {
        if let Err(e) = state.store.delete(old_key).await {
            tracing::warn!("failed to delete old profile picture '{}': {}", old_key, e);
        }
    }

    let key = storage::profile_picture_key(&user.id_string(), &filename);
    state.store.put(&key, bytes, &content_type).await?;

    // 3. Only then is the new key recorded.
    db::users(&state.db)
        .update_one(
            doc! { "_id": user.id },
            doc! { "$set": { "profile_picture": &key } },
        )
        .await?;

    Ok(Json(json!({ "profile_picture": key })))
}

/// Get a presigned download link for the current user's profile picture.
pub async fn get_my_picture(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let key = user
        .profile_picture
        .as_deref()
        .ok_or(AppError::NotFound("No profile picture".to_string()))?;

    let url = state.store.presign_get(key, PRESIGN_TTL_SECS).await?;

    Ok(Json(json!({ "url": url })))
}

/// Delete the current user's account.
///
/// The profile picture is removed from the object store first (best-effort),
/// then the record.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(key) = &user.profile_picture {
        if let Err(e) = state.store.delete(key).await {
            tracing::warn!("failed to delete profile picture '{}': {}", key, e);
        }
    }

    let result = db::users(&state.db)
        .delete_one(doc! { "_id": user.id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
