//! Login, registration and the session token middleware

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use kitoboy_common::api::auth::{issue_token, verify_password, verify_token, DEFAULT_TOKEN_TTL};
use kitoboy_common::db::{create_user, find_user};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Username of the authenticated operator, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Trimmed username and password, `None` if either is blank
    fn trimmed(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().map(str::trim).unwrap_or_default();
        let password = self.password.as_deref().map(str::trim).unwrap_or_default();

        (!username.is_empty() && !password.is_empty()).then_some((username, password))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn incorrect_credentials() -> ApiError {
    ApiError::Unauthorized("Incorrect credentials".to_string())
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(credentials) = payload.map_err(|_| incorrect_credentials())?;
    let (username, password) = credentials.trimmed().ok_or_else(incorrect_credentials)?;

    let user = find_user(&state.db, username)
        .await?
        .ok_or_else(incorrect_credentials)?;

    if !verify_password(password, &user.password_hash) {
        debug!(username = %username, "Password mismatch");
        return Err(incorrect_credentials());
    }

    info!(username = %user.username, "Operator logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: issue_token(&user.username, &state.auth_secret, DEFAULT_TOKEN_TTL)
            .map_err(anyhow::Error::from)?,
    }))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(credentials) = payload?;
    let (username, password) = credentials
        .trimmed()
        .ok_or_else(|| ApiError::bad_request("Incorrect credentials"))?;

    create_user(&state.db, username, password).await?;

    info!(username = %username, "Registered operator");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Session token middleware
///
/// Requires `Authorization: Bearer <token>`. Returns 401 otherwise.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let username = verify_token(token, &state.auth_secret).map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::Unauthorized("Unauthorized".to_string())
    })?;

    request.extensions_mut().insert(AuthUser(username));
    Ok(next.run(request).await)
}
