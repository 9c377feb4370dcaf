use async_trait::async_trait;
use s3commander_core::AppResult;
use s3commander_domain::{AccessRequest, BucketName, PermanentGrant, RequestId, RequestStatus};

/// Query parameters for access request listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequestQuery {
    /// Optional subject filter.
    pub subject: Option<String>,
    /// Optional status filter.
    pub status: Option<RequestStatus>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for pagination.
    pub offset: usize,
}

/// Repository port for standing per-user permission records.
#[async_trait]
pub trait PermanentGrantRepository: Send + Sync {
    /// Finds the standing grant for a subject, if one was stored.
    async fn find_for_subject(&self, subject: &str) -> AppResult<Option<PermanentGrant>>;

    /// Replaces the standing grant for a subject.
    async fn save_for_subject(&self, subject: &str, grant: &PermanentGrant) -> AppResult<()>;
}

/// Repository port for temporary access requests.
#[async_trait]
pub trait AccessRequestRepository: Send + Sync {
    /// Persists a newly submitted request.
    async fn create(&self, request: &AccessRequest) -> AppResult<()>;

    /// Finds a request by identifier.
    async fn find(&self, request_id: RequestId) -> AppResult<Option<AccessRequest>>;

    /// Persists the current state of an existing request.
    async fn update(&self, request: &AccessRequest) -> AppResult<()>;

    /// Lists requests matching the query, newest first.
    async fn list(&self, query: AccessRequestQuery) -> AppResult<Vec<AccessRequest>>;

    /// Lists approved requests for one subject and bucket.
    ///
    /// Expiry is not filtered here; the resolver checks it live against the
    /// wall clock so a stale row can never widen access.
    async fn list_approved_for_bucket(
        &self,
        subject: &str,
        bucket: &BucketName,
    ) -> AppResult<Vec<AccessRequest>>;

    /// Lists all approved requests for one subject.
    async fn list_approved_for_subject(&self, subject: &str) -> AppResult<Vec<AccessRequest>>;

    /// Finds a pending request for one subject and bucket, if any.
    async fn find_pending_for_bucket(
        &self,
        subject: &str,
        bucket: &BucketName,
    ) -> AppResult<Option<AccessRequest>>;
}
