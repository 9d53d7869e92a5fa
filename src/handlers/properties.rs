// src/handlers/properties.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
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
    models::property::{
        CreatePropertyRequest, Property, PropertyFeatures, PropertyLocation, PropertyView,
        UpdatePropertyRequest, UploadedImage,
    },
    models::plan,
    state::AppState,
    storage::{self, ObjectStore, PRESIGN_TTL_SECS},
    utils::jwt::CurrentUser,
};

/// The property multipart form. Scalar values arrive as text fields,
/// `location` and `features` as JSON-encoded text, images as file fields
/// named `images`.
#[derive(Debug, Default)]
struct PropertyForm {
    name: Option<String>,
    price: Option<f64>,
    property_type: Option<String>,
    phone_number: Option<String>,
    location: Option<PropertyLocation>,
    features: Option<PropertyFeatures>,
    images: Vec<UploadedImage>,
}

async fn read_property_form(multipart: &mut Multipart) -> Result<PropertyForm, AppError> {
    let mut form = PropertyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "images" => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.images.push(UploadedImage {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "name" => form.name = Some(read_text(field).await?),
            "price" => {
                let text = read_text(field).await?;
                form.price = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::BadRequest("Price must be a number".to_string()))?,
                );
            }
            "property_type" => form.property_type = Some(read_text(field).await?),
            "phone_number" => form.phone_number = Some(read_text(field).await?),
            // Unparsable nested JSON is a validation error; From<serde_json::Error>
            // maps it to a 400.
            "location" => form.location = Some(serde_json::from_str(&read_text(field).await?)?),
            "features" => form.features = Some(serde_json::from_str(&read_text(field).await?)?),
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or(AppError::BadRequest(format!("Missing field '{}'", name)))
}

/// Resolves stored image keys into presigned URLs, regenerated per read.
async fn resolve_view(
    store: &dyn ObjectStore,
    property: Property,
) -> Result<PropertyView, AppError> {
    let mut urls = Vec::with_capacity(property.images.len());
    for key in &property.images {
        urls.push(store.presign_get(key, PRESIGN_TTL_SECS).await?);
    }
    Ok(PropertyView::from_record(property, urls))
}

/// Create a listing. Two write phases: the record first, then the images.
///
/// Quota is enforced against the owner's current plan before anything is
/// written. Image uploads are not rolled back; a partial upload leaves the
/// record with the keys that made it and answers 500 naming the property,
/// so the outcome is discoverable.
pub async fn create_property(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_property_form(&mut multipart).await?;

    let request = CreatePropertyRequest {
        name: required(form.name, "name")?,
        price: required(form.price, "price")?,
        property_type: required(form.property_type, "property_type")?,
        phone_number: required(form.phone_number, "phone_number")?,
        location: required(form.location, "location")?,
        features: required(form.features, "features")?,
    };

    if let Err(validation_errors) = request.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let owner_id = user.id_string();
    let properties = db::properties(&state.db);

    // 1. Quota check. Count-then-insert is not atomic: two creates racing
    //    the same count can both pass and leave the owner one over quota.
    let count = properties
        .count_documents(doc! { "owner_id": &owner_id })
        .await?;
    let limit = plan::quota_for(user.plan);

    if count >= limit {
        return Err(AppError::BadRequest(format!(
            "You have reached the limit of {} properties on the {} plan. Upgrade to a higher plan.",
            limit, user.plan
        )));
    }

    // 2. Insert the record without images.
    let property = Property {
        id: None,
        owner_id: owner_id.clone(),
        name: request.name,
        price: request.price,
        property_type: request.property_type,
        phone_number: request.phone_number,
        location: request.location,
        features: request.features,
        images: Vec::new(),
        created_at: DateTime::now(),
    };

    let result = properties.insert_one(&property).await?;
    let oid = result
        .inserted_id
        .as_object_id()
        .ok_or(AppError::InternalServerError(
            "insert returned no id".to_string(),
        ))?;
    let property_id = oid.to_hex();

    // 3. Upload images, collecting keys in order. No rollback on failure.
    let total = form.images.len();
    let mut keys = Vec::with_capacity(total);
    let mut upload_error = None;

    for image in form.images {
        let key = storage::property_image_key(&owner_id, &property_id, &image.filename);
        match state.store.put(&key, image.bytes, &image.content_type).await {
            Ok(()) => keys.push(key),
            Err(e) => {
                upload_error = Some(e);
                break;
            }
        }
    }

    // 4. Patch the record with whatever reached the store.
    properties
        .update_one(doc! { "_id": oid }, doc! { "$set": { "images": &keys } })
        .await?;

    if let Some(e) = upload_error {
        tracing::error!(
            "property {} created with {}/{} images: {}",
            property_id,
            keys.len(),
            total,
            e
        );
        return Err(AppError::Storage(format!(
            "Property {} was created with {} of {} images",
            property_id,
            keys.len(),
            total
        )));
    }

    Ok((StatusCode::CREATED, Json(json!({ "id": property_id }))))
}

/// List every property, image keys resolved to presigned URLs.
pub async fn list_properties(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut cursor = db::properties(&state.db).find(doc! {}).await?;

    let mut views = Vec::new();
    while let Some(property) = cursor.try_next().await? {
        views.push(resolve_view(state.store.as_ref(), property).await?);
    }

    Ok(Json(views))
}

/// List the current user's properties. An owner with no listings gets a 404.
pub async fn list_my_properties(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = user.id_string();
    let mut cursor = db::properties(&state.db)
        .find(doc! { "owner_id": &owner_id })
        .await?;

    let mut views = Vec::new();
    while let Some(property) = cursor.try_next().await? {
        views.push(resolve_view(state.store.as_ref(), property).await?);
    }

    if views.is_empty() {
        return Err(AppError::NotFound(
            "No properties found for this user".to_string(),
        ));
    }

    Ok(Json(views))
}

/// Get a single property by id.
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oid = db::parse_object_id(&id)?;

    let property = db::properties(&state.db)
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or(AppError::NotFound("Property not found".to_string()))?;

    Ok(Json(resolve_view(state.store.as_ref(), property).await?))
}

/// Partial update of an owned property.
///
/// The filter matches on {id, owner} so a listing that exists but belongs to
/// someone else is indistinguishable from one that does not exist. Supplied
/// image files replace the stored image list wholesale.
pub async fn update_property(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let oid = db::parse_object_id(&id)?;
    let owner_id = user.id_string();

    let form = read_property_form(&mut multipart).await?;

    let update = UpdatePropertyRequest {
        name: form.name,
        price: form.price,
        property_type: form.property_type,
        phone_number: form.phone_number,
        location: form.location,
        features: form.features,
    };

    if let Err(validation_errors) = update.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let properties = db::properties(&state.db);

    let existing = properties
        .find_one(doc! { "_id": oid, "owner_id": &owner_id })
        .await?
        .ok_or(AppError::NotFound("Property not found".to_string()))?;

    let mut set = update.to_set_document()?;

    if !form.images.is_empty() {
        // Upload the replacements first; only a fully uploaded set is
        // recorded.
        let mut keys = Vec::with_capacity(form.images.len());
        for image in form.images {
            let key = storage::property_image_key(&owner_id, &id, &image.filename);
            state.store.put(&key, image.bytes, &image.content_type).await?;
            keys.push(key);
        }

        // The previous objects are removed best-effort.
        for old_key in &existing.images {
            if keys.contains(old_key) {
                continue;
            }
            if let Err(e) = state.store.delete(old_key).await {
                tracing::warn!("failed to delete replaced image '{}': {}", old_key, e);
            }
        }

        set.insert("images", keys);
    }

    if set.is_empty() {
        return Ok(StatusCode::NO_CONTENT);
    }

    properties
        .update_one(
            doc! { "_id": oid, "owner_id": &owner_id },
            doc! { "$set": set },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete an owned property together with its images.
///
/// Every image deletion is attempted (and logged on failure) before the
/// record goes; afterwards the id is pulled from all wishlists.
pub async fn delete_property(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oid = db::parse_object_id(&id)?;
    let owner_id = user.id_string();

    let properties = db::properties(&state.db);

    let existing = properties
        .find_one(doc! { "_id": oid, "owner_id": &owner_id })
        .await?
        .ok_or(AppError::NotFound("Property not found".to_string()))?;

    for key in &existing.images {
        if let Err(e) = state.store.delete(key).await {
            tracing::warn!("failed to delete image '{}' of property {}: {}", key, id, e);
        }
    }

    let result = properties
        .delete_one(doc! { "_id": oid, "owner_id": &owner_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Property not found".to_string()));
    }

    // Referential cleanup: drop the listing from every saved wishlist.
    db::users(&state.db)
        .update_many(doc! {}, doc! { "$pull": { "wishlist": &id } })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
