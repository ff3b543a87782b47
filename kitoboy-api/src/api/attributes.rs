//! Attribute catalogue and post-attribute links

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use kitoboy_common::models::{Attribute, Post};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{attributes, posts};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Largest catalogue page returned by `/get-attributes`
const ATTRIBUTES_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct AttributesResponse {
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeLinkRequest {
    #[serde(default)]
    pub attribute_id: Option<String>,
}

/// One classifier prediction
#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub prediction: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct PostPredictions {
    pub id: String,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddPostsAttributesRequest {
    #[serde(default)]
    pub texts: Vec<PostPredictions>,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

fn incorrect_params() -> ApiError {
    ApiError::bad_request("Incorrect params")
}

/// Trimmed post id and attribute id, or 400
fn link_params(
    post_id: &str,
    payload: Result<Json<AttributeLinkRequest>, JsonRejection>,
) -> ApiResult<(String, String)> {
    let Json(body) = payload.map_err(|_| incorrect_params())?;
    let post_id = post_id.trim();
    let attribute_id = body.attribute_id.as_deref().map(str::trim).unwrap_or_default();

    if post_id.is_empty() || attribute_id.is_empty() {
        return Err(incorrect_params());
    }

    Ok((post_id.to_string(), attribute_id.to_string()))
}

/// GET /get-attributes
pub async fn get_attributes(State(state): State<AppState>) -> ApiResult<Json<AttributesResponse>> {
    let attributes = attributes::list_attributes(&state.db, ATTRIBUTES_LIMIT).await?;
    Ok(Json(AttributesResponse { attributes }))
}

/// POST /add-attribute/:postId
///
/// Links an existing attribute to an existing post. Linking twice is a no-op.
pub async fn add_attribute(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<AttributeLinkRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let (post_id, attribute_id) = link_params(&post_id, payload)?;

    let mut conn = state.db.acquire().await?;
    if posts::find_post(&mut conn, &post_id).await?.is_none()
        || !attributes::attribute_exists(&state.db, &attribute_id).await?
    {
        return Err(incorrect_params());
    }

    attributes::link_attribute(&mut conn, &post_id, &attribute_id).await?;

    Ok(StatusCode::ACCEPTED)
}

/// POST /remove-attribute/:postId
pub async fn remove_attribute(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<AttributeLinkRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let (post_id, attribute_id) = link_params(&post_id, payload)?;

    if !attributes::unlink_attribute(&state.db, &post_id, &attribute_id).await? {
        return Err(ApiError::not_found(format!(
            "Attribute {} not found at post {}",
            attribute_id, post_id
        )));
    }

    Ok(StatusCode::OK)
}

/// POST /add-posts-attributes
///
/// Classifier callback. Attributes are matched by trimmed name and created
/// with the reported color when new. Unknown post ids are skipped.
pub async fn add_posts_attributes(
    State(state): State<AppState>,
    payload: Result<Json<AddPostsAttributesRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PostsResponse>)> {
    let Json(body) = payload.map_err(|_| incorrect_params())?;
    if body.texts.is_empty() {
        return Err(incorrect_params());
    }

    let mut tx = state.db.begin().await?;
    let mut updated = Vec::with_capacity(body.texts.len());
    let mut links = 0usize;

    for text in &body.texts {
        let post_id = text.id.trim();
        let Some(post) = posts::find_post(&mut tx, post_id).await? else {
            warn!(post_id = %post_id, "Predictions for unknown post skipped");
            continue;
        };

        for prediction in &text.predictions {
            let name = prediction.prediction.trim();
            if name.is_empty() {
                continue;
            }

            let attribute_id =
                attributes::find_or_create_attribute(&mut tx, name, prediction.color.trim()).await?;
            if attributes::link_attribute(&mut tx, &post.id, &attribute_id).await? {
                links += 1;
            }
        }

        updated.push(post);
    }

    tx.commit().await?;

    info!(posts = updated.len(), links, "Stored classifier predictions");
    Ok((StatusCode::ACCEPTED, Json(PostsResponse { posts: updated })))
}
