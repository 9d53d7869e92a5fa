// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};

use crate::{db, error::AppError, models::user::User, state::AppState};

/// What a signed token may be used for. A token minted for one purpose is
/// invalid for every other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    /// Session authentication (long-lived).
    Access,
    /// Email activation link.
    Verify,
    /// Password-reset link (short-lived).
    Reset,
}

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the user's email address.
    pub sub: String,
    pub purpose: TokenPurpose,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new token for the given subject and purpose.
pub fn sign_token(
    subject: &str,
    purpose: TokenPurpose,
    ttl_secs: i64,
    secret: &str,
) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as i64;

    let claims = Claims {
        sub: subject.to_owned(),
        purpose,
        exp: (now + ttl_secs).max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies a token and returns its subject (the email address).
///
/// Every decode failure - bad signature, malformed token, expiry, wrong
/// purpose - collapses into the same error, so callers cannot leak which
/// check failed.
pub fn verify_token(
    token: &str,
    expected_purpose: TokenPurpose,
    secret: &str,
) -> Result<String, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    if token_data.claims.purpose != expected_purpose {
        return Err(AppError::AuthError("Invalid token".to_string()));
    }

    Ok(token_data.claims.sub)
}

/// The authenticated user, resolved once per request by [`auth_middleware`]
/// and injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header, resolves the token
/// subject to a user record and injects it for handlers to use.
/// An invalid token is a 401; a valid token whose subject no longer exists
/// is a 404.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err(AppError::AuthError("Invalid token".to_string())),
    };

    let email = verify_token(token, TokenPurpose::Access, &state.config.jwt_secret)?;

    let user = db::users(&state.db)
        .find_one(doc! { "email": &email })
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";

    #[test]
    fn token_round_trip_returns_the_subject() {
        let token = sign_token("a@x.com", TokenPurpose::Access, 600, SECRET).unwrap();

        let subject = verify_token(&token, TokenPurpose::Access, SECRET).unwrap();
        assert_eq!(subject, "a@x.com");
    }

    #[test]
    fn purpose_mismatch_is_rejected() {
        let token = sign_token("a@x.com", TokenPurpose::Verify, 600, SECRET).unwrap();

        assert!(verify_token(&token, TokenPurpose::Access, SECRET).is_err());
        assert!(verify_token(&token, TokenPurpose::Reset, SECRET).is_err());
        assert!(verify_token(&token, TokenPurpose::Verify, SECRET).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = sign_token("a@x.com", TokenPurpose::Access, 600, SECRET).unwrap();

        // Flip one character of the signed payload segment.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let payload = &mut parts[1];
        let flipped = if payload.ends_with('A') { "B" } else { "A" };
        payload.replace_range(payload.len() - 1.., flipped);
        let tampered = parts.join(".");

        assert!(verify_token(&tampered, TokenPurpose::Access, SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected_even_with_valid_signature() {
        // Expiry two minutes in the past, beyond the default decode leeway.
        let token = sign_token("a@x.com", TokenPurpose::Access, -120, SECRET).unwrap();

        assert!(verify_token(&token, TokenPurpose::Access, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token("a@x.com", TokenPurpose::Access, 600, SECRET).unwrap();

        assert!(verify_token(&token, TokenPurpose::Access, "other_secret").is_err());
    }
}
