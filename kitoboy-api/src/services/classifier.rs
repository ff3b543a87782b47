//! Post classifier client
//!
//! Uploaded posts are sent to the classifier in one batch. The classifier
//! accepts the batch with 202 and later reports attributes back through
//! `POST /add-posts-attributes`.

use kitoboy_common::models::Post;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("kitoboy-api/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Classifier client errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    texts: Vec<PredictText<'a>>,
}

#[derive(Debug, Serialize)]
struct PredictText<'a> {
    text_id: &'a str,
    text: &'a str,
}

/// Classifier HTTP client
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl ClassifierClient {
    pub fn new(base_url: &str) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/predict_on_batch", base_url.trim().trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Queue posts for classification
    pub async fn predict_on_batch(&self, posts: &[Post]) -> Result<(), ClassifierError> {
        let body = PredictRequest {
            texts: posts
                .iter()
                .map(|post| PredictText {
                    text_id: &post.id,
                    text: &post.text,
                })
                .collect(),
        };

        tracing::debug!(posts = posts.len(), endpoint = %self.endpoint, "Sending posts to classifier");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::ApiError(status.as_u16(), error_text));
        }

        tracing::info!(posts = posts.len(), "Posts queued for classification");
        Ok(())
    }
}
