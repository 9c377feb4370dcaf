use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use s3commander_core::{AppError, AppResult, UserIdentity};
use s3commander_domain::{AccessLevel, BucketAccess, BucketName, Operation, WriteAccessMode};

use crate::access_ports::{AccessRequestRepository, PermanentGrantRepository};
use crate::access_resolver::{GrantSnapshot, resolve};

/// One bucket a principal can reach, with the effective decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedBucket {
    /// Bucket name.
    pub bucket: String,
    /// Effective access for the bucket.
    pub access: BucketAccess,
}

/// The set of buckets a principal can reach.
///
/// Privileged roles and all-mode standing grants have no individually tracked
/// bucket list; surfaces enumerating "this user's buckets" must special-case
/// [`AccessibleBuckets::All`] rather than querying grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessibleBuckets {
    /// Every bucket in the store, each with the same effective access.
    All {
        /// Access applied uniformly to every bucket.
        access: BucketAccess,
    },
    /// Only the enumerated buckets.
    Granted(Vec<GrantedBucket>),
}

/// Application service computing effective bucket access.
///
/// Fetches the standing grant and the bucket's approved requests as
/// independent concurrent reads, snapshots them once, and resolves the
/// decision purely over that snapshot.
#[derive(Clone)]
pub struct AccessService {
    grants: Arc<dyn PermanentGrantRepository>,
    requests: Arc<dyn AccessRequestRepository>,
}

impl AccessService {
    /// Creates a new access service from repository implementations.
    #[must_use]
    pub fn new(
        grants: Arc<dyn PermanentGrantRepository>,
        requests: Arc<dyn AccessRequestRepository>,
    ) -> Self {
        Self { grants, requests }
    }

    /// Computes the effective access decision for a bucket at the current time.
    pub async fn evaluate(
        &self,
        identity: &UserIdentity,
        bucket_name: &str,
    ) -> AppResult<BucketAccess> {
        let bucket = BucketName::new(bucket_name)?;
        let snapshot = self.snapshot(identity.subject(), &bucket).await?;

        Ok(resolve(identity.role(), &bucket, &snapshot, Utc::now()))
    }

    /// Ensures the identity may perform the operation on the bucket.
    pub async fn require(
        &self,
        identity: &UserIdentity,
        bucket_name: &str,
        operation: Operation,
    ) -> AppResult<BucketAccess> {
        let access = self.evaluate(identity, bucket_name).await?;
        if !access.allows(operation) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' lacks {} access to bucket '{bucket_name}'",
                identity.subject(),
                operation.as_str()
            )));
        }

        Ok(access)
    }

    /// Fetches the grant data for one subject and bucket as a single snapshot.
    pub async fn snapshot(&self, subject: &str, bucket: &BucketName) -> AppResult<GrantSnapshot> {
        let (permanent, requests) = tokio::join!(
            self.grants.find_for_subject(subject),
            self.requests.list_approved_for_bucket(subject, bucket),
        );

        Ok(GrantSnapshot {
            permanent: permanent?,
            requests: requests?,
        })
    }

    /// Returns the buckets the identity can currently reach.
    pub async fn accessible_buckets(
        &self,
        identity: &UserIdentity,
    ) -> AppResult<AccessibleBuckets> {
        if identity.is_privileged() {
            return Ok(AccessibleBuckets::All {
                access: BucketAccess::full(),
            });
        }

        let (permanent, approved) = tokio::join!(
            self.grants.find_for_subject(identity.subject()),
            self.requests.list_approved_for_subject(identity.subject()),
        );
        let permanent = permanent?.unwrap_or_default();
        let approved = approved?;

        if permanent.write_access == WriteAccessMode::All {
            return Ok(AccessibleBuckets::All {
                access: BucketAccess {
                    level: AccessLevel::Full,
                    can_write: true,
                    can_delete: permanent.can_delete,
                },
            });
        }

        let now = Utc::now();
        let mut buckets: BTreeMap<String, GrantedBucket> = BTreeMap::new();

        if permanent.write_access == WriteAccessMode::Selective {
            for bucket in &permanent.buckets {
                buckets.insert(
                    bucket.clone(),
                    GrantedBucket {
                        bucket: bucket.clone(),
                        access: BucketAccess {
                            level: AccessLevel::Full,
                            can_write: true,
                            can_delete: permanent.can_delete,
                        },
                    },
                );
            }
        }

        for request in approved {
            if !request.is_active(now) {
                continue;
            }

            // Standing grants already claimed the bucket with a wider level.
            buckets
                .entry(request.bucket.as_str().to_owned())
                .or_insert_with(|| GrantedBucket {
                    bucket: request.bucket.as_str().to_owned(),
                    access: BucketAccess {
                        level: AccessLevel::Limited {
                            expires_at: request.expires_at,
                        },
                        can_write: true,
                        can_delete: false,
                    },
                });
        }

        Ok(AccessibleBuckets::Granted(buckets.into_values().collect()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use s3commander_core::{AppResult, Role, UserIdentity};
    use s3commander_domain::{
        AccessLevel, AccessRequest, BucketName, Operation, PermanentGrant, RequestId,
        RequestStatus, WriteAccessMode,
    };
    use tokio::sync::Mutex;

    use crate::access_ports::{
        AccessRequestQuery, AccessRequestRepository, PermanentGrantRepository,
    };

    use super::{AccessService, AccessibleBuckets};

    #[derive(Default)]
    struct FakeGrantRepository {
        grants: Mutex<HashMap<String, PermanentGrant>>,
    }

    #[async_trait]
    impl PermanentGrantRepository for FakeGrantRepository {
        async fn find_for_subject(&self, subject: &str) -> AppResult<Option<PermanentGrant>> {
            Ok(self.grants.lock().await.get(subject).cloned())
        }

        async fn save_for_subject(&self, subject: &str, grant: &PermanentGrant) -> AppResult<()> {
            self.grants
                .lock()
                .await
                .insert(subject.to_owned(), grant.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRequestRepository {
        requests: Mutex<Vec<AccessRequest>>,
    }

    #[async_trait]
    impl AccessRequestRepository for FakeRequestRepository {
        async fn create(&self, request: &AccessRequest) -> AppResult<()> {
            self.requests.lock().await.push(request.clone());
            Ok(())
        }

        async fn find(&self, request_id: RequestId) -> AppResult<Option<AccessRequest>> {
            Ok(self
                .requests
                .lock()
                .await
                .iter()
                .find(|request| request.request_id == request_id)
                .cloned())
        }

        async fn update(&self, request: &AccessRequest) -> AppResult<()> {
            let mut requests = self.requests.lock().await;
            if let Some(stored) = requests
                .iter_mut()
                .find(|stored| stored.request_id == request.request_id)
            {
                *stored = request.clone();
            }
            Ok(())
        }

        async fn list(&self, query: AccessRequestQuery) -> AppResult<Vec<AccessRequest>> {
            Ok(self
                .requests
                .lock()
                .await
                .iter()
                .filter(|request| {
                    query
                        .subject
                        .as_deref()
                        .is_none_or(|subject| request.subject == subject)
                })
                .filter(|request| query.status.is_none_or(|status| request.status == status))
                .skip(query.offset)
                .take(query.limit)
                .cloned()
                .collect())
        }

        async fn list_approved_for_bucket(
            &self,
            subject: &str,
            bucket: &BucketName,
        ) -> AppResult<Vec<AccessRequest>> {
            Ok(self
                .requests
                .lock()
                .await
                .iter()
                .filter(|request| {
                    request.subject == subject
                        && request.bucket == *bucket
                        && request.status == RequestStatus::Approved
                })
                .cloned()
                .collect())
        }

        async fn list_approved_for_subject(&self, subject: &str) -> AppResult<Vec<AccessRequest>> {
            Ok(self
                .requests
                .lock()
                .await
                .iter()
                .filter(|request| {
                    request.subject == subject && request.status == RequestStatus::Approved
                })
                .cloned()
                .collect())
        }

        async fn find_pending_for_bucket(
            &self,
            subject: &str,
            bucket: &BucketName,
        ) -> AppResult<Option<AccessRequest>> {
            Ok(self
                .requests
                .lock()
                .await
                .iter()
                .find(|request| {
                    request.subject == subject
                        && request.bucket == *bucket
                        && request.status == RequestStatus::Pending
                })
                .cloned())
        }
    }

    fn user(subject: &str) -> UserIdentity {
        UserIdentity::new(subject, "Alice Doe", None, Role::User)
    }

    fn service() -> (
        AccessService,
        Arc<FakeGrantRepository>,
        Arc<FakeRequestRepository>,
    ) {
        let grants = Arc::new(FakeGrantRepository::default());
        let requests = Arc::new(FakeRequestRepository::default());
        let service = AccessService::new(grants.clone(), requests.clone());
        (service, grants, requests)
    }

    async fn store_approved(
        requests: &FakeRequestRepository,
        subject: &str,
        bucket: &str,
        duration_minutes: u32,
    ) -> AppResult<AccessRequest> {
        let mut request = AccessRequest::submit(
            subject,
            "Alice Doe",
            None,
            BucketName::new(bucket)?,
            "eu-central-1",
            "temporary access for testing",
            Utc::now(),
        )?;
        request.approve("admin", duration_minutes, Utc::now())?;
        requests.create(&request).await?;
        Ok(request)
    }

    #[tokio::test]
    async fn empty_bucket_name_is_an_invalid_argument() {
        let (service, _, _) = service();
        let result = service.evaluate(&user("alice"), "  ").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn evaluate_reflects_an_approved_request() -> AppResult<()> {
        let (service, _, requests) = service();
        store_approved(&requests, "alice", "b1", 60).await?;

        let access = service.evaluate(&user("alice"), "b1").await?;
        assert!(matches!(access.level, AccessLevel::Limited { .. }));
        assert!(access.can_write);
        assert!(!access.can_delete);
        Ok(())
    }

    #[tokio::test]
    async fn require_rejects_a_missing_grant() {
        let (service, _, _) = service();
        let result = service
            .require(&user("alice"), "b1", Operation::Write)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn privileged_identity_sees_all_buckets() -> AppResult<()> {
        let (service, _, _) = service();
        let admin = UserIdentity::new("root", "Root", None, Role::Admin);
        let buckets = service.accessible_buckets(&admin).await?;
        assert!(matches!(buckets, AccessibleBuckets::All { access } if access.can_delete));
        Ok(())
    }

    #[tokio::test]
    async fn all_mode_grant_maps_to_all_buckets() -> AppResult<()> {
        let (service, grants, _) = service();
        grants
            .save_for_subject(
                "alice",
                &PermanentGrant {
                    write_access: WriteAccessMode::All,
                    buckets: Default::default(),
                    can_delete: true,
                },
            )
            .await?;

        let buckets = service.accessible_buckets(&user("alice")).await?;
        assert!(matches!(buckets, AccessibleBuckets::All { access } if access.can_delete));
        Ok(())
    }

    #[tokio::test]
    async fn granted_buckets_merge_standing_and_temporary_grants() -> AppResult<()> {
        let (service, grants, requests) = service();
        grants
            .save_for_subject(
                "alice",
                &PermanentGrant {
                    write_access: WriteAccessMode::Selective,
                    buckets: ["b1".to_owned()].into(),
                    can_delete: true,
                },
            )
            .await?;
        store_approved(&requests, "alice", "b2", 60).await?;
        // A standing claim on b1 outranks a temporary one for the same bucket.
        store_approved(&requests, "alice", "b1", 60).await?;

        let buckets = service.accessible_buckets(&user("alice")).await?;
        let AccessibleBuckets::Granted(granted) = buckets else {
            panic!("expected an enumerated bucket list");
        };

        assert_eq!(granted.len(), 2);
        assert_eq!(granted[0].bucket, "b1");
        assert_eq!(granted[0].access.level, AccessLevel::Full);
        assert!(granted[0].access.can_delete);
        assert_eq!(granted[1].bucket, "b2");
        assert!(matches!(
            granted[1].access.level,
            AccessLevel::Limited { .. }
        ));
        assert!(!granted[1].access.can_delete);
        Ok(())
    }
}
