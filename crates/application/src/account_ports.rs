use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3commander_core::{AppResult, Role};

/// Portal account provisioned from directory identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Stable directory subject.
    pub subject: String,
    /// Display name from the directory record.
    pub display_name: String,
    /// Email from the directory record, if present.
    pub email: Option<String>,
    /// Portal role.
    pub role: Role,
    /// Provisioning moment.
    pub created_at: DateTime<Utc>,
}

/// Repository port for portal accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Finds an account by directory subject.
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<Account>>;

    /// Persists a new account.
    async fn insert(&self, account: &Account) -> AppResult<()>;

    /// Refreshes the denormalized directory profile fields.
    async fn update_profile(
        &self,
        subject: &str,
        display_name: &str,
        email: Option<&str>,
    ) -> AppResult<()>;

    /// Replaces the role of an existing account.
    async fn update_role(&self, subject: &str, role: Role) -> AppResult<()>;

    /// Counts all accounts.
    async fn count(&self) -> AppResult<u64>;

    /// Counts accounts holding the given role.
    async fn count_with_role(&self, role: Role) -> AppResult<u64>;

    /// Lists all accounts ordered by provisioning time.
    async fn list(&self) -> AppResult<Vec<Account>>;
}
