use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use s3commander_application::PermanentGrantRepository;
use s3commander_core::{AppError, AppResult};
use s3commander_domain::{PermanentGrant, WriteAccessMode};

/// PostgreSQL-backed repository for standing per-user permissions.
#[derive(Clone)]
pub struct PostgresPermanentGrantRepository {
    pool: PgPool,
}

impl PostgresPermanentGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PermanentGrantRow {
    write_access: String,
    buckets: Vec<String>,
    can_delete: bool,
}

impl PermanentGrantRow {
    fn into_domain(self) -> AppResult<PermanentGrant> {
        Ok(PermanentGrant {
            write_access: WriteAccessMode::from_str(self.write_access.as_str())?,
            buckets: self.buckets.into_iter().collect::<BTreeSet<String>>(),
            can_delete: self.can_delete,
        })
    }
}

#[async_trait]
impl PermanentGrantRepository for PostgresPermanentGrantRepository {
    async fn find_for_subject(&self, subject: &str) -> AppResult<Option<PermanentGrant>> {
        let row = sqlx::query_as::<_, PermanentGrantRow>(
            r#"
            SELECT write_access, buckets, can_delete
            FROM permanent_grants
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load permanent grant for subject '{subject}': {error}"
            ))
        })?;

        row.map(PermanentGrantRow::into_domain).transpose()
    }

    async fn save_for_subject(&self, subject: &str, grant: &PermanentGrant) -> AppResult<()> {
        let buckets: Vec<String> = grant.buckets.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO permanent_grants (subject, write_access, buckets, can_delete, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (subject) DO UPDATE
            SET write_access = EXCLUDED.write_access,
                buckets = EXCLUDED.buckets,
                can_delete = EXCLUDED.can_delete,
                updated_at = now()
            "#,
        )
        .bind(subject)
        .bind(grant.write_access.as_str())
        .bind(buckets)
        .bind(grant.can_delete)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save permanent grant for subject '{subject}': {error}"
            ))
        })?;

        Ok(())
    }
}
