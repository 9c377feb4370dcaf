use async_trait::async_trait;
use s3commander_core::AppResult;

/// Identity profile returned by the directory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProfile {
    /// Stable subject claim.
    pub subject: String,
    /// Display name.
    pub display_name: String,
    /// Email, if the directory exposes one.
    pub email: Option<String>,
}

/// Client port for the directory authentication service.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Verifies a directory session token and returns the profile behind it.
    async fn verify_session_token(&self, token: &str) -> AppResult<DirectoryProfile>;
}
