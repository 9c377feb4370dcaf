use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use s3commander_application::{DirectoryClient, DirectoryProfile};
use s3commander_core::{AppError, AppResult};

/// HTTP client for the directory authentication service.
pub struct HttpDirectoryClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpDirectoryClient {
    /// Creates a directory client against `base_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct DirectoryProfileResponse {
    subject: String,
    display_name: String,
    email: Option<String>,
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn verify_session_token(&self, token: &str) -> AppResult<DirectoryProfile> {
        let url = self.base_url.join("v1/sessions/verify").map_err(|error| {
            AppError::Internal(format!("invalid directory endpoint: {error}"))
        })?;

        tracing::debug!(url = %url, "verifying directory session token");

        let response = self
            .http_client
            .post(url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("directory transport error: {error}"))
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized(
                "directory rejected the session token".to_owned(),
            ));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "directory returned status {status}: {body}"
            )));
        }

        let profile: DirectoryProfileResponse = response.json().await.map_err(|error| {
            AppError::Internal(format!("directory returned malformed profile: {error}"))
        })?;

        Ok(DirectoryProfile {
            subject: profile.subject,
            display_name: profile.display_name,
            email: profile.email,
        })
    }
}
