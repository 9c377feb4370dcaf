use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3commander_core::AppResult;
use s3commander_domain::BucketName;

/// Bucket metadata returned by the storage gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    /// Bucket name.
    pub name: String,
    /// Region the bucket lives in.
    pub region: String,
}

/// Object metadata returned by the storage gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size_bytes: u64,
    /// Last modification moment, when reported.
    pub last_modified: Option<DateTime<Utc>>,
}

/// A time-limited URL for direct object transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    /// Signed URL.
    pub url: String,
    /// Moment the URL stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Client port for the object-storage gateway.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Lists all buckets visible to the portal.
    async fn list_buckets(&self) -> AppResult<Vec<BucketSummary>>;

    /// Lists objects in a bucket, optionally under a key prefix.
    async fn list_objects(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
    ) -> AppResult<Vec<ObjectSummary>>;

    /// Issues a presigned download URL for one object.
    async fn presign_download(&self, bucket: &BucketName, key: &str) -> AppResult<PresignedUrl>;

    /// Issues a presigned upload URL for one object.
    async fn presign_upload(&self, bucket: &BucketName, key: &str) -> AppResult<PresignedUrl>;

    /// Deletes one object.
    async fn delete_object(&self, bucket: &BucketName, key: &str) -> AppResult<()>;
}
