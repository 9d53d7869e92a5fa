// src/routes.rs

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{get, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, plans, properties, reviews, users, wishlist},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Uploads (property images, profile pictures) may carry several photos.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, properties, wishlist, plans, reviews).
/// * Applies global middleware (Trace, CORS) and rate limiting on auth.
/// * Injects global state (database, object store, mailer, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:5173".parse().unwrap(),
        "http://127.0.0.1:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Credential endpoints are the brute-force target; keep them slow.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
            .unwrap(),
    );

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify-email", get(auth::verify_email))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(GovernorLayer::new(governor_conf));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/{id}", get(users::get_user))
        // Protected profile routes
        .merge(
            Router::new()
                .route(
                    "/me",
                    get(users::get_me)
                        .put(users::update_me)
                        .delete(users::delete_me),
                )
                .route(
                    "/me/picture",
                    post(users::upload_my_picture).get(users::get_my_picture),
                )
                .route("/me/reviews", get(reviews::list_my_reviews))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let property_routes = Router::new()
        .route("/", get(properties::list_properties))
        .route("/{id}", get(properties::get_property))
        .route("/{id}/reviews", get(reviews::list_property_reviews))
        // Protected listing routes
        .merge(
            Router::new()
                .route("/", post(properties::create_property))
                .route("/mine", get(properties::list_my_properties))
                .route(
                    "/{id}",
                    put(properties::update_property).delete(properties::delete_property),
                )
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let wishlist_routes = Router::new()
        .route("/", get(wishlist::list_wishlist))
        .route(
            "/{property_id}",
            post(wishlist::add_to_wishlist).delete(wishlist::remove_from_wishlist),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let plan_routes = Router::new()
        .route("/", get(plans::list_plans))
        .route("/{name}", get(plans::get_plan))
        .merge(
            Router::new()
                .route("/upgrade", post(plans::upgrade_plan))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let review_routes = Router::new()
        .route("/", post(reviews::create_review))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/wishlist", wishlist_routes)
        .nest("/api/plans", plan_routes)
        .nest("/api/reviews", review_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
