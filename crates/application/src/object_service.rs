use std::sync::Arc;

use s3commander_core::{AppResult, NonEmptyString, UserIdentity};
use s3commander_domain::{AuditAction, BucketAccess, BucketName, Operation};

use crate::access_service::{AccessService, AccessibleBuckets};
use crate::audit_ports::{AuditEvent, AuditRepository};
use crate::storage_ports::{ObjectStoreClient, ObjectSummary, PresignedUrl};

/// One bucket visible to a principal, with region and effective access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketListing {
    /// Bucket name.
    pub name: String,
    /// Region from the storage gateway, when the bucket exists there.
    pub region: Option<String>,
    /// Effective access for the bucket.
    pub access: BucketAccess,
}

/// Application service proxying object operations behind access checks.
///
/// Every operation is resolved against the caller's grants first and audited
/// after the storage gateway confirms it.
#[derive(Clone)]
pub struct ObjectService {
    access: AccessService,
    store: Arc<dyn ObjectStoreClient>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ObjectService {
    /// Creates a new object service.
    #[must_use]
    pub fn new(
        access: AccessService,
        store: Arc<dyn ObjectStoreClient>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access,
            store,
            audit_repository,
        }
    }

    /// Lists the buckets the identity can reach.
    pub async fn list_buckets(&self, identity: &UserIdentity) -> AppResult<Vec<BucketListing>> {
        let accessible = self.access.accessible_buckets(identity).await?;
        let store_buckets = self.store.list_buckets().await?;

        match accessible {
            AccessibleBuckets::All { access } => Ok(store_buckets
                .into_iter()
                .map(|bucket| BucketListing {
                    name: bucket.name,
                    region: Some(bucket.region),
                    access,
                })
                .collect()),
            AccessibleBuckets::Granted(granted) => Ok(granted
                .into_iter()
                .map(|entry| {
                    let region = store_buckets
                        .iter()
                        .find(|bucket| bucket.name == entry.bucket)
                        .map(|bucket| bucket.region.clone());
                    BucketListing {
                        name: entry.bucket,
                        region,
                        access: entry.access,
                    }
                })
                .collect()),
        }
    }

    /// Lists objects in a bucket the identity can read.
    pub async fn list_objects(
        &self,
        identity: &UserIdentity,
        bucket_name: &str,
        prefix: Option<&str>,
    ) -> AppResult<Vec<ObjectSummary>> {
        self.access
            .require(identity, bucket_name, Operation::Read)
            .await?;

        let bucket = BucketName::new(bucket_name)?;
        self.store.list_objects(&bucket, prefix).await
    }

    /// Issues a presigned download URL for one object.
    pub async fn download_url(
        &self,
        identity: &UserIdentity,
        bucket_name: &str,
        key: &str,
    ) -> AppResult<PresignedUrl> {
        let (bucket, key) = self
            .authorize(identity, bucket_name, key, Operation::Read)
            .await?;

        let url = self.store.presign_download(&bucket, key.as_str()).await?;
        self.append_object_event(identity, AuditAction::ObjectDownloaded, &bucket, key.as_str())
            .await?;

        Ok(url)
    }

    /// Issues a presigned upload URL for one object.
    pub async fn upload_url(
        &self,
        identity: &UserIdentity,
        bucket_name: &str,
        key: &str,
    ) -> AppResult<PresignedUrl> {
        let (bucket, key) = self
            .authorize(identity, bucket_name, key, Operation::Write)
            .await?;

        let url = self.store.presign_upload(&bucket, key.as_str()).await?;
        self.append_object_event(identity, AuditAction::ObjectUploaded, &bucket, key.as_str())
            .await?;

        Ok(url)
    }

    /// Deletes one object.
    pub async fn delete_object(
        &self,
        identity: &UserIdentity,
        bucket_name: &str,
        key: &str,
    ) -> AppResult<()> {
        let (bucket, key) = self
            .authorize(identity, bucket_name, key, Operation::Delete)
            .await?;

        self.store.delete_object(&bucket, key.as_str()).await?;
        self.append_object_event(identity, AuditAction::ObjectDeleted, &bucket, key.as_str())
            .await?;

        Ok(())
    }

    async fn authorize(
        &self,
        identity: &UserIdentity,
        bucket_name: &str,
        key: &str,
        operation: Operation,
    ) -> AppResult<(BucketName, NonEmptyString)> {
        let key = NonEmptyString::new(key)?;
        self.access.require(identity, bucket_name, operation).await?;

        Ok((BucketName::new(bucket_name)?, key))
    }

    async fn append_object_event(
        &self,
        identity: &UserIdentity,
        action: AuditAction,
        bucket: &BucketName,
        key: &str,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor_subject: identity.subject().to_owned(),
                actor_name: identity.display_name().to_owned(),
                action,
                resource_type: "object".to_owned(),
                resource_id: format!("{bucket}/{key}"),
                detail: None,
            })
            .await
    }
}
