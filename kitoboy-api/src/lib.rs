//! kitoboy-api library
//!
//! Case-management HTTP service: operators upload avatar post exports,
//! review classifier attributes and triage persons and avatars.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use error::{ApiError, ApiResult};
use services::ClassifierClient;

/// Largest accepted request body (avatar exports included)
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Session token signing secret
    pub auth_secret: Arc<str>,
    /// `None` disables post classification
    pub classifier: Option<ClassifierClient>,
    /// CORS allow-list; empty allows any origin
    pub allowed_origins: Arc<[String]>,
    pub startup_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        auth_secret: impl Into<Arc<str>>,
        classifier: Option<ClassifierClient>,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            db,
            auth_secret: auth_secret.into(),
            classifier,
            allowed_origins: allowed_origins.into(),
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
///
/// Everything except `/health`, `/login`, `/register` and the classifier
/// callback requires a session token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/add-attribute/:postId", post(api::add_attribute))
        .route("/remove-attribute/:postId", post(api::remove_attribute))
        .route("/create-avatar", post(api::create_avatar))
        .route("/get-attributes", get(api::get_attributes))
        .route("/get-statuses", get(api::get_statuses))
        .route("/get-avatar/:avatarId", get(api::get_avatar))
        .route("/get-avatar/:avatarId/dynamics", get(api::get_avatar_dynamics))
        .route("/get-avatars", post(api::get_avatars))
        .route("/get-person-with-avatars/:personId", get(api::get_person_with_avatars))
        .route("/search-person", get(api::search_person))
        .route("/update-person/:personId", post(api::update_person))
        .route("/update-person-status/:personId", post(api::update_person_status))
        .route("/update-avatar-status/:avatarId", post(api::update_avatar_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/login", post(api::login))
        .route("/register", post(api::register))
        .route("/add-posts-attributes", post(api::add_posts_attributes))
        .merge(api::health_routes());

    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .merge(protected)
        .merge(public)
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(origins)
}
