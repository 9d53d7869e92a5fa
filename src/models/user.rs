// src/models/user.rs

use std::sync::OnceLock;

use mongodb::bson::oid::ObjectId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::plan::PlanName;

/// A document in the 'users' collection.
///
/// Serde is the database codec here, so the password hash must serialize;
/// responses go through [`UserResponse`] instead, which never carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    /// Unique, stored lowercase.
    pub email: String,

    /// Argon2 password hash.
    pub password_hash: String,

    pub phone_number: String,

    /// False until the email-verification token is redeemed.
    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub plan: PlanName,

    /// Saved property ids. Set semantics, enforced on insert.
    #[serde(default)]
    pub wishlist: Vec<String>,

    /// Storage key of the profile picture, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    pub created_at: mongodb::bson::DateTime,
}

impl User {
    /// The id as the 24-hex-char string clients see.
    pub fn id_string(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// What the API returns for a user. No credential material.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub is_active: bool,
    pub plan: PlanName,
    pub wishlist: Vec<String>,
    pub profile_picture: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            is_active: user.is_active,
            plan: user.plan,
            wishlist: user.wishlist,
            profile_picture: user.profile_picture,
            created_at: user.created_at.to_chrono(),
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters."))]
    pub name: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(custom(function = validate_password_strength))]
    pub password: String,
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Partial profile update: only supplied fields change.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(custom(function = validate_password_strength))]
    pub new_password: String,
}

/// Emails are compared and stored lowercase so lookups never miss on case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// At least 8 characters, with a digit, an uppercase and a lowercase letter.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(ValidationError::new("password_too_short")
            .with_message("Password must be at least 8 characters long".into()));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_needs_digit")
            .with_message("Password must include a number".into()));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ValidationError::new("password_needs_uppercase")
            .with_message("Password must include an uppercase letter".into()));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ValidationError::new("password_needs_lowercase")
            .with_message("Password must include a lowercase letter".into()));
    }
    Ok(())
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").expect("valid phone regex"))
}

fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if !phone_regex().is_match(phone) {
        return Err(ValidationError::new("invalid_phone_number")
            .with_message("Invalid phone number".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Ada".to_string(),
            email: "a@x.com".to_string(),
            password: password.to_string(),
            phone_number: "+2348012345678".to_string(),
        }
    }

    #[test]
    fn strong_password_passes() {
        assert!(request("Passw0rd").validate().is_ok());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        for weak in ["short1A", "no-digits-HERE", "no-uppercase-1", "NO-LOWERCASE-1"] {
            assert!(request(weak).validate().is_err(), "{} should fail", weak);
        }
    }

    #[test]
    fn phone_numbers_are_checked() {
        let mut req = request("Passw0rd");
        req.phone_number = "not-a-phone".to_string();
        assert!(req.validate().is_err());

        req.phone_number = "080-1234-5678".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn emails_normalize_to_lowercase() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }
}
