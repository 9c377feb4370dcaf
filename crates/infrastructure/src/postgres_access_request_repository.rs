use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use s3commander_application::{AccessRequestQuery, AccessRequestRepository};
use s3commander_core::{AppError, AppResult};
use s3commander_domain::{AccessRequest, BucketName, RequestId, RequestStatus, ReviewRecord};

/// PostgreSQL-backed repository for temporary access requests.
#[derive(Clone)]
pub struct PostgresAccessRequestRepository {
    pool: PgPool,
}

impl PostgresAccessRequestRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    id, subject, requester_name, requester_email, bucket, region, justification,
    status, requested_at, expires_at, decided_by, decided_at, decision_reason,
    revoked_by, revoked_at, revoke_reason
"#;

#[derive(sqlx::FromRow)]
struct AccessRequestRow {
    id: Uuid,
    subject: String,
    requester_name: String,
    requester_email: Option<String>,
    bucket: String,
    region: String,
    justification: String,
    status: String,
    requested_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
    decided_at: Option<DateTime<Utc>>,
    decision_reason: Option<String>,
    revoked_by: Option<String>,
    revoked_at: Option<DateTime<Utc>>,
    revoke_reason: Option<String>,
}

impl AccessRequestRow {
    fn into_domain(self) -> AppResult<AccessRequest> {
        let decision = match (self.decided_by, self.decided_at) {
            (Some(actor_subject), Some(at)) => Some(ReviewRecord {
                actor_subject,
                at,
                reason: self.decision_reason,
            }),
            _ => None,
        };
        let revocation = match (self.revoked_by, self.revoked_at) {
            (Some(actor_subject), Some(at)) => Some(ReviewRecord {
                actor_subject,
                at,
                reason: self.revoke_reason,
            }),
            _ => None,
        };

        Ok(AccessRequest {
            request_id: RequestId::from_uuid(self.id),
            subject: self.subject,
            requester_name: self.requester_name,
            requester_email: self.requester_email,
            bucket: BucketName::new(self.bucket)?,
            region: self.region,
            justification: self.justification,
            status: RequestStatus::from_str(self.status.as_str())?,
            requested_at: self.requested_at,
            expires_at: self.expires_at,
            decision,
            revocation,
        })
    }
}

#[async_trait]
impl AccessRequestRepository for PostgresAccessRequestRepository {
    async fn create(&self, request: &AccessRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO access_requests (
                id, subject, requester_name, requester_email, bucket, region,
                justification, status, requested_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(request.request_id.as_uuid())
        .bind(request.subject.as_str())
        .bind(request.requester_name.as_str())
        .bind(request.requester_email.as_deref())
        .bind(request.bucket.as_str())
        .bind(request.region.as_str())
        .bind(request.justification.as_str())
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create access request: {error}"))
        })?;

        Ok(())
    }

    async fn find(&self, request_id: RequestId) -> AppResult<Option<AccessRequest>> {
        let row = sqlx::query_as::<_, AccessRequestRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM access_requests WHERE id = $1"
        ))
        .bind(request_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load access request '{request_id}': {error}"
            ))
        })?;

        row.map(AccessRequestRow::into_domain).transpose()
    }

    async fn update(&self, request: &AccessRequest) -> AppResult<()> {
        let decision = request.decision.as_ref();
        let revocation = request.revocation.as_ref();

        let rows_affected = sqlx::query(
            r#"
            UPDATE access_requests
            SET status = $2,
                expires_at = $3,
                decided_by = $4,
                decided_at = $5,
                decision_reason = $6,
                revoked_by = $7,
                revoked_at = $8,
                revoke_reason = $9
            WHERE id = $1
            "#,
        )
        .bind(request.request_id.as_uuid())
        .bind(request.status.as_str())
        .bind(request.expires_at)
        .bind(decision.map(|record| record.actor_subject.as_str()))
        .bind(decision.map(|record| record.at))
        .bind(decision.and_then(|record| record.reason.as_deref()))
        .bind(revocation.map(|record| record.actor_subject.as_str()))
        .bind(revocation.map(|record| record.at))
        .bind(revocation.and_then(|record| record.reason.as_deref()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update access request '{}': {error}",
                request.request_id
            ))
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "access request '{}' was not found",
                request.request_id
            )));
        }

        Ok(())
    }

    async fn list(&self, query: AccessRequestQuery) -> AppResult<Vec<AccessRequest>> {
        let capped_limit = query.limit.clamp(1, 200) as i64;
        let capped_offset = query.offset.min(5_000) as i64;

        let rows = sqlx::query_as::<_, AccessRequestRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM access_requests
            WHERE ($1::TEXT IS NULL OR subject = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY requested_at DESC
            LIMIT $3
            OFFSET $4
            "#
        ))
        .bind(query.subject)
        .bind(query.status.map(|status| status.as_str().to_owned()))
        .bind(capped_limit)
        .bind(capped_offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list access requests: {error}")))?;

        rows.into_iter()
            .map(AccessRequestRow::into_domain)
            .collect()
    }

    async fn list_approved_for_bucket(
        &self,
        subject: &str,
        bucket: &BucketName,
    ) -> AppResult<Vec<AccessRequest>> {
        // Expiry is deliberately not filtered here: the resolver compares it
        // against the wall clock on every call.
        let rows = sqlx::query_as::<_, AccessRequestRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM access_requests
            WHERE subject = $1
              AND bucket = $2
              AND status = 'approved'
            ORDER BY expires_at DESC
            "#
        ))
        .bind(subject)
        .bind(bucket.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list approved requests for subject '{subject}' and bucket '{bucket}': {error}"
            ))
        })?;

        rows.into_iter()
            .map(AccessRequestRow::into_domain)
            .collect()
    }

    async fn list_approved_for_subject(&self, subject: &str) -> AppResult<Vec<AccessRequest>> {
        let rows = sqlx::query_as::<_, AccessRequestRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM access_requests
            WHERE subject = $1
              AND status = 'approved'
            ORDER BY expires_at DESC
            "#
        ))
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list approved requests for subject '{subject}': {error}"
            ))
        })?;

        rows.into_iter()
            .map(AccessRequestRow::into_domain)
            .collect()
    }

    async fn find_pending_for_bucket(
        &self,
        subject: &str,
        bucket: &BucketName,
    ) -> AppResult<Option<AccessRequest>> {
        let row = sqlx::query_as::<_, AccessRequestRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM access_requests
            WHERE subject = $1
              AND bucket = $2
              AND status = 'pending'
            ORDER BY requested_at DESC
            LIMIT 1
            "#
        ))
        .bind(subject)
        .bind(bucket.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find pending request for subject '{subject}' and bucket '{bucket}': {error}"
            ))
        })?;

        row.map(AccessRequestRow::into_domain).transpose()
    }
}
