// src/handlers/auth.rs

use axum::{Json, extract::Query, extract::State, http::StatusCode, response::IntoResponse};
use mongodb::bson::{DateTime, doc};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    db,
    error::AppError,
    mail,
    models::{
        plan::PlanName,
        user::{
            CreateUserRequest, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, User,
            normalize_email,
        },
    },
    state::AppState,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{TokenPurpose, sign_token, verify_token},
    },
};

/// Registers a new user.
///
/// The account starts inactive; a verification email with an activation link
/// is dispatched on a detached task. Returns 201 Created and the new id.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(&payload.email);
    let users = db::users(&state.db);

    // 1. Reject duplicate emails up front.
    if users.find_one(doc! { "email": &email }).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Email '{}' already exists",
            email
        )));
    }

    // 2. Store the record; only the hash ever reaches the database.
    let password_hash = hash_password(&payload.password)?;

    let user = User {
        id: None,
        name: payload.name,
        email: email.clone(),
        password_hash,
        phone_number: payload.phone_number,
        is_active: false,
        plan: PlanName::default(),
        wishlist: Vec::new(),
        profile_picture: None,
        created_at: DateTime::now(),
    };

    let result = users.insert_one(&user).await.map_err(|e| {
        // Mongo error code for a unique-index violation is E11000, in case a
        // concurrent registration slipped past the lookup above.
        if e.to_string().contains("E11000") {
            AppError::Conflict(format!("Email '{}' already exists", email))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    let id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    // 3. Fire-and-forget the verification email.
    let token = sign_token(
        &email,
        TokenPurpose::Verify,
        state.config.verify_token_ttl_secs,
        &state.config.jwt_secret,
    )?;
    let content = mail::verification_email(&state.config, &user.name, &token);
    mail::send_detached(state.mailer.clone(), email, content.subject, content.html_body);

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Authenticates a user and returns a bearer token.
///
/// Fails uniformly whether the email is unknown or the password is wrong,
/// so callers cannot probe for registered addresses.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(&payload.email);

    let user = db::users(&state.db)
        .find_one(doc! { "email": &email })
        .await?
        .ok_or(AppError::AuthError(
            "Incorrect email or password".to_string(),
        ))?;

    let is_valid = verify_password(&payload.password, &user.password_hash)?;

    if !is_valid {
        return Err(AppError::AuthError(
            "Incorrect email or password".to_string(),
        ));
    }

    let token = sign_token(
        &user.email,
        TokenPurpose::Access,
        state.config.access_token_ttl_secs,
        &state.config.jwt_secret,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "is_active": user.is_active
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailParams {
    pub token: String,
}

/// Redeems an email-verification token and activates the account.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyEmailParams>,
) -> Result<impl IntoResponse, AppError> {
    let email = verify_token(&params.token, TokenPurpose::Verify, &state.config.jwt_secret)?;

    let result = db::users(&state.db)
        .update_one(
            doc! { "email": &email },
            doc! { "$set": { "is_active": true } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({ "message": "Email verified" })))
}

/// Sends a password-reset link.
///
/// Unknown addresses still get a 200 so the endpoint cannot be used to
/// enumerate accounts; inactive accounts are refused since activation must
/// come first.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(&payload.email);

    let user = db::users(&state.db).find_one(doc! { "email": &email }).await?;

    if let Some(user) = user {
        if !user.is_active {
            return Err(AppError::BadRequest(
                "Account is not activated".to_string(),
            ));
        }

        let token = sign_token(
            &email,
            TokenPurpose::Reset,
            state.config.reset_token_ttl_secs,
            &state.config.jwt_secret,
        )?;
        let content = mail::reset_password_email(&state.config, &user.name, &token);
        mail::send_detached(state.mailer.clone(), email, content.subject, content.html_body);
    }

    Ok(Json(json!({ "message": "Email has been sent" })))
}

/// Redeems a reset token and replaces the stored password hash.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = verify_token(&payload.token, TokenPurpose::Reset, &state.config.jwt_secret)?;

    let password_hash = hash_password(&payload.new_password)?;

    let result = db::users(&state.db)
        .update_one(
            doc! { "email": &email },
            doc! { "$set": { "password_hash": password_hash } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({ "message": "Password reset successful" })))
}
