// src/models/property.rs

use mongodb::bson::{self, Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Street-level location of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PropertyLocation {
    #[validate(length(min = 1, max = 200))]
    pub street_address: String,
    #[validate(length(min = 1, max = 100))]
    pub area: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
}

/// Amenities advertised on a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFeatures {
    pub number_of_rooms: u32,
    pub number_of_toilets: u32,
    pub running_water: bool,
    /// Plaster-of-Paris ceiling.
    pub pop_available: bool,
}

/// A document in the 'properties' collection. Owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Id string of the owning user.
    pub owner_id: String,

    pub name: String,
    pub price: f64,
    pub property_type: String,
    pub phone_number: String,

    pub location: PropertyLocation,
    pub features: PropertyFeatures,

    /// Ordered object-store keys, namespaced `properties/{owner}/{id}/...`.
    /// Empty until the second write phase attaches them.
    #[serde(default)]
    pub images: Vec<String>,

    pub created_at: mongodb::bson::DateTime,
}

/// A listing as the API returns it: image keys resolved to presigned URLs,
/// regenerated on every read.
#[derive(Debug, Serialize)]
pub struct PropertyView {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub price: f64,
    pub property_type: String,
    pub phone_number: String,
    pub location: PropertyLocation,
    pub features: PropertyFeatures,
    pub images: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PropertyView {
    pub fn from_record(property: Property, image_urls: Vec<String>) -> Self {
        Self {
            id: property.id.map(|id| id.to_hex()).unwrap_or_default(),
            owner_id: property.owner_id,
            name: property.name,
            price: property.price,
            property_type: property.property_type,
            phone_number: property.phone_number,
            location: property.location,
            features: property.features,
            images: image_urls,
            created_at: property.created_at.to_chrono(),
        }
    }
}

/// Scalar listing fields as they arrive in the multipart create form.
/// `location` and `features` arrive as JSON-encoded text fields.
#[derive(Debug, Validate)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters."))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price must not be negative."))]
    pub price: f64,
    #[validate(length(min = 1, max = 100))]
    pub property_type: String,
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,
    #[validate(nested)]
    pub location: PropertyLocation,
    pub features: PropertyFeatures,
}

/// Partial update: only supplied fields are written. A supplied image list
/// replaces the stored one wholesale; that is handled by the caller, not
/// here.
#[derive(Debug, Default, Validate)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(min = 1, max = 100))]
    pub property_type: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone_number: Option<String>,
    #[validate(nested)]
    pub location: Option<PropertyLocation>,
    pub features: Option<PropertyFeatures>,
}

impl UpdatePropertyRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.property_type.is_none()
            && self.phone_number.is_none()
            && self.location.is_none()
            && self.features.is_none()
    }

    /// Builds the `$set` payload containing exactly the supplied fields.
    pub fn to_set_document(&self) -> Result<Document, bson::ser::Error> {
        let mut set = doc! {};
        if let Some(name) = &self.name {
            set.insert("name", name);
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(property_type) = &self.property_type {
            set.insert("property_type", property_type);
        }
        if let Some(phone_number) = &self.phone_number {
            set.insert("phone_number", phone_number);
        }
        if let Some(location) = &self.location {
            set.insert("location", bson::to_bson(location)?);
        }
        if let Some(features) = &self.features {
            set.insert("features", bson::to_bson(features)?);
        }
        Ok(set)
    }
}

/// One file pulled out of a multipart body.
#[derive(Debug)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
