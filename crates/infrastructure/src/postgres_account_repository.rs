use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use s3commander_application::{Account, AccountRepository};
use s3commander_core::{AppError, AppResult, Role};

/// PostgreSQL-backed repository for portal accounts.
#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    subject: String,
    display_name: String,
    email: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_domain(self) -> AppResult<Account> {
        Ok(Account {
            subject: self.subject,
            display_name: self.display_name,
            email: self.email,
            role: Role::from_str(self.role.as_str())?,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT subject, display_name, email, role, created_at
            FROM accounts
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load account for subject '{subject}': {error}"
            ))
        })?;

        row.map(AccountRow::into_domain).transpose()
    }

    async fn insert(&self, account: &Account) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (subject, display_name, email, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.subject.as_str())
        .bind(account.display_name.as_str())
        .bind(account.email.as_deref())
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert account for subject '{}': {error}",
                account.subject
            ))
        })?;

        Ok(())
    }

    async fn update_profile(
        &self,
        subject: &str,
        display_name: &str,
        email: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET display_name = $2,
                email = $3
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .bind(display_name)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to refresh profile for subject '{subject}': {error}"
            ))
        })?;

        Ok(())
    }

    async fn update_role(&self, subject: &str, role: Role) -> AppResult<()> {
        let rows_affected = sqlx::query("UPDATE accounts SET role = $2 WHERE subject = $1")
            .bind(subject)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to update role for subject '{subject}': {error}"
                ))
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "account for subject '{subject}' was not found"
            )));
        }

        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count accounts: {error}")))?;

        Ok(count.unsigned_abs())
    }

    async fn count_with_role(&self, role: Role) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to count accounts with role '{}': {error}",
                    role.as_str()
                ))
            })?;

        Ok(count.unsigned_abs())
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT subject, display_name, email, role, created_at
            FROM accounts
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list accounts: {error}")))?;

        rows.into_iter().map(AccountRow::into_domain).collect()
    }
}
