// src/db.rs

use mongodb::{Collection, Database};
use mongodb::bson::oid::ObjectId;

use crate::error::AppError;
use crate::models::{property::Property, review::Review, user::User};

pub const USERS: &str = "users";
pub const PROPERTIES: &str = "properties";
pub const REVIEWS: &str = "reviews";

/// Typed handle to the `users` collection.
pub fn users(db: &Database) -> Collection<User> {
    db.collection(USERS)
}

pub fn properties(db: &Database) -> Collection<Property> {
    db.collection(PROPERTIES)
}

pub fn reviews(db: &Database) -> Collection<Review> {
    db.collection(REVIEWS)
}

/// Parses a 24-hex-char identifier supplied by a client.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(AppError::from)
}
