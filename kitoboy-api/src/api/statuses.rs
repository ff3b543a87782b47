//! Status catalogue

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use kitoboy_common::models::Status;
use serde::{Deserialize, Serialize};

use crate::db::statuses;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const STATUSES_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct StatusesResponse {
    pub statuses: Vec<Status>,
}

/// Body of the status update endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    #[serde(default)]
    pub status_id: Option<String>,
}

/// GET /get-statuses
pub async fn get_statuses(State(state): State<AppState>) -> ApiResult<Json<StatusesResponse>> {
    let statuses = statuses::list_statuses(&state.db, STATUSES_LIMIT).await?;
    Ok(Json(StatusesResponse { statuses }))
}

/// Validate a status update: target id present, status present and known
pub(crate) async fn checked_status_update(
    state: &AppState,
    target_id: &str,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<(String, String)> {
    let Json(body) = payload.map_err(|_| ApiError::bad_request("Incorrect params"))?;
    let target_id = target_id.trim();
    let status_id = body.status_id.as_deref().map(str::trim).unwrap_or_default();

    if target_id.is_empty() || status_id.is_empty() {
        return Err(ApiError::bad_request("Incorrect params"));
    }

    if !statuses::status_exists(&state.db, status_id).await? {
        return Err(ApiError::bad_request(format!("Unknown status {}", status_id)));
    }

    Ok((target_id.to_string(), status_id.to_string()))
}
