//! Person lookup, search and edits

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use kitoboy_common::models::{PersonRecord, PersonWithAvatarsView};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::AuthUser;
use super::statuses::{checked_status_update, StatusRequest};
use crate::db::persons::{self, PersonFields};
use crate::db::{avatars, statuses};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Most persons returned by one search
const SEARCH_LIMIT: usize = 20;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub search_string: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonsResponse {
    pub persons: Vec<PersonRecord>,
}

/// GET /get-person-with-avatars/:personId
pub async fn get_person_with_avatars(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<PersonWithAvatarsView>> {
    let person = persons::find_person(&state.db, person_id.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Person not found"))?;

    let avatars = avatars::avatar_summaries_for_person(&state.db, &person.id).await?;
    let status = match &person.status_id {
        Some(status_id) => statuses::statuses_by_id(&state.db).await?.remove(status_id),
        None => None,
    };

    Ok(Json(PersonWithAvatarsView {
        id: person.id,
        surname: person.surname,
        name: person.name,
        second_name: person.second_name,
        age: person.age,
        address: person.address,
        phone: person.phone,
        organization: person.organization,
        description: person.description,
        status,
        avatars,
    }))
}

/// GET /search-person?searchString=
pub async fn search_person(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PersonsResponse>> {
    let search = query.search_string.unwrap_or_default();
    let persons = persons::search_persons(&state.db, &search, SEARCH_LIMIT).await?;

    Ok(Json(PersonsResponse { persons }))
}

/// POST /update-person/:personId
///
/// Only fields present in the body change.
pub async fn update_person(
    State(state): State<AppState>,
    Extension(AuthUser(operator)): Extension<AuthUser>,
    Path(person_id): Path<String>,
    payload: Result<Json<PersonFields>, JsonRejection>,
) -> ApiResult<Json<PersonRecord>> {
    let Json(fields) = payload.map_err(|_| ApiError::bad_request("Incorrect params"))?;
    let person_id = person_id.trim();

    if person_id.is_empty() {
        return Err(ApiError::bad_request("Incorrect params"));
    }
    if fields.columns().is_empty() {
        return Err(ApiError::bad_request("Incorrect body params"));
    }

    let person = persons::update_person(&state.db, person_id, &fields)
        .await?
        .ok_or_else(|| ApiError::bad_request("Error while updating person"))?;

    info!(person_id = %person_id, operator = %operator, "Person updated");
    Ok(Json(person))
}

/// POST /update-person-status/:personId
pub async fn update_person_status(
    State(state): State<AppState>,
    Extension(AuthUser(operator)): Extension<AuthUser>,
    Path(person_id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<PersonRecord>> {
    let (person_id, status_id) = checked_status_update(&state, &person_id, payload).await?;

    let person = persons::update_person_status(&state.db, &person_id, &status_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Error while updating person status"))?;

    info!(person_id = %person_id, status = %status_id, operator = %operator, "Person status changed");
    Ok(Json(person))
}
