//! Avatar upload, listing and triage

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use kitoboy_common::csv_import::parse_avatar_csv;
use kitoboy_common::models::{AvatarRecord, AvatarView};
use kitoboy_common::pagination::Pagination;
use kitoboy_common::plural::format_integer_with_caption;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use super::auth::AuthUser;
use super::statuses::{checked_status_update, StatusRequest};
use crate::db::persons::{self, PersonFields};
use crate::db::{avatars, posts};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const CLASSIFIER_FAILED: &str =
    "Error while sending posts to prediction, but avatar has been successfully created";

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AvatarsResponse {
    pub avatars: Vec<AvatarView>,
    pub page: i64,
    pub pages: i64,
}

fn incorrect_file() -> ApiError {
    ApiError::bad_request("IncorrectFile")
}

/// Text form fields plus the uploaded file
#[derive(Debug, Default)]
struct AvatarForm {
    file: Option<Bytes>,
    fields: HashMap<String, String>,
}

impl AvatarForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = AvatarForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "file" {
                form.file = Some(field.bytes().await.map_err(|_| incorrect_file())?);
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed non-empty text field
    fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn person_fields(&self) -> PersonFields {
        let owned = |name: &str| self.get(name).map(str::to_string);

        PersonFields {
            surname: owned("surname"),
            name: owned("name"),
            second_name: owned("secondName"),
            age: owned("age"),
            address: owned("address"),
            phone: owned("phone"),
            organization: owned("organization"),
            description: owned("description"),
        }
    }
}

/// POST /create-avatar
///
/// Multipart upload: `file` (post export CSV), `username`, `url`, and either
/// `personId` or the fields of a new person. Person, avatar and posts are
/// stored in one transaction before the posts are sent to the classifier;
/// a classifier failure leaves them in place.
pub async fn create_avatar(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let multipart = multipart.map_err(|_| incorrect_file())?;
    let form = AvatarForm::read(multipart).await?;

    let file = form
        .file
        .as_ref()
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(incorrect_file)?;
    let parsed = parse_avatar_csv(file).map_err(|e| {
        warn!("Rejected avatar export: {}", e);
        incorrect_file()
    })?;

    let username = form
        .get("username")
        .ok_or_else(|| ApiError::bad_request("Incorrect avatar params"))?;
    let url = form.get("url").unwrap_or_default();

    let mut tx = state.db.begin().await?;

    let person_id = match form.get("personId") {
        Some(person_id) => {
            if !persons::person_exists(&mut tx, person_id).await? {
                return Err(ApiError::bad_request("Incorrect person params"));
            }
            person_id.to_string()
        }
        None => persons::create_person(&mut tx, &form.person_fields()).await?,
    };

    let avatar_id = avatars::create_avatar(&mut tx, username, url, &person_id).await?;
    let created = posts::insert_posts(&mut tx, &avatar_id, &parsed).await?;

    tx.commit().await?;

    info!(
        avatar_id = %avatar_id,
        person_id = %person_id,
        "Created avatar with {}",
        format_integer_with_caption(created.len() as u64, "пост", "поста", "постов")
    );

    match &state.classifier {
        None => info!("No classifier configured; posts not sent for prediction"),
        Some(_) if created.is_empty() => {}
        Some(classifier) => {
            if let Err(e) = classifier.predict_on_batch(&created).await {
                warn!(avatar_id = %avatar_id, "Classifier dispatch failed: {}", e);
                return Err(ApiError::bad_request(CLASSIFIER_FAILED));
            }
        }
    }

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: avatar_id })))
}

/// GET /get-avatar/:avatarId
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(avatar_id): Path<String>,
) -> ApiResult<Json<AvatarView>> {
    avatars::fetch_avatar_view(&state.db, avatar_id.trim())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Avatar not found"))
}

/// POST /get-avatars
///
/// Newest first. The body may be omitted for the first page. Pages past
/// the end are empty.
pub async fn get_avatars(
    State(state): State<AppState>,
    body: Option<Json<PageRequest>>,
) -> ApiResult<Json<AvatarsResponse>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let total = avatars::count_avatars(&state.db).await?;
    let pagination = Pagination::new(request.page, request.size, total);
    let avatars = if pagination.is_exhausted() {
        Vec::new()
    } else {
        avatars::list_avatar_views(&state.db, pagination.size, pagination.offset).await?
    };

    Ok(Json(AvatarsResponse {
        avatars,
        page: pagination.page,
        pages: pagination.total_pages,
    }))
}

/// POST /update-avatar-status/:avatarId
pub async fn update_avatar_status(
    State(state): State<AppState>,
    Extension(AuthUser(operator)): Extension<AuthUser>,
    Path(avatar_id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<AvatarRecord>> {
    let (avatar_id, status_id) = checked_status_update(&state, &avatar_id, payload).await?;

    let avatar = avatars::update_avatar_status(&state.db, &avatar_id, &status_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("Error while updating avatar status"))?;

    info!(avatar_id = %avatar_id, status = %status_id, operator = %operator, "Avatar status changed");
    Ok(Json(avatar))
}
