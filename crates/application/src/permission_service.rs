use std::sync::Arc;

use s3commander_core::{AppResult, UserIdentity};
use s3commander_domain::{AuditAction, BucketName, PermanentGrant, WriteAccessMode};

use crate::access_ports::PermanentGrantRepository;
use crate::audit_ports::{AuditEvent, AuditRepository};
use crate::require_privileged;

/// Application service administering standing per-user permissions.
#[derive(Clone)]
pub struct PermissionAdminService {
    grants: Arc<dyn PermanentGrantRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PermissionAdminService {
    /// Creates a new permission admin service from repository implementations.
    #[must_use]
    pub fn new(
        grants: Arc<dyn PermanentGrantRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            grants,
            audit_repository,
        }
    }

    /// Returns the standing grant for a subject; absence reads as all-deny.
    pub async fn permanent_grant_for(
        &self,
        actor: &UserIdentity,
        subject: &str,
    ) -> AppResult<PermanentGrant> {
        require_privileged(actor)?;

        Ok(self
            .grants
            .find_for_subject(subject)
            .await?
            .unwrap_or_default())
    }

    /// Replaces the standing grant for a subject.
    pub async fn set_permanent_grant(
        &self,
        actor: &UserIdentity,
        subject: &str,
        grant: PermanentGrant,
    ) -> AppResult<PermanentGrant> {
        require_privileged(actor)?;

        if grant.write_access == WriteAccessMode::Selective {
            for bucket in &grant.buckets {
                BucketName::new(bucket.as_str())?;
            }
        }

        let grant = grant.normalized();
        self.grants.save_for_subject(subject, &grant).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor_subject: actor.subject().to_owned(),
                actor_name: actor.display_name().to_owned(),
                action: AuditAction::PermanentGrantUpdated,
                resource_type: "permanent_grant".to_owned(),
                resource_id: subject.to_owned(),
                detail: Some(format!(
                    "set write access '{}' ({} buckets), delete {}",
                    grant.write_access.as_str(),
                    grant.buckets.len(),
                    if grant.can_delete {
                        "enabled"
                    } else {
                        "disabled"
                    }
                )),
            })
            .await?;

        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;

    use async_trait::async_trait;
    use s3commander_core::{AppResult, Role, UserIdentity};
    use s3commander_domain::{PermanentGrant, WriteAccessMode};
    use tokio::sync::Mutex;

    use crate::access_ports::PermanentGrantRepository;
    use crate::audit_ports::{AuditEvent, AuditRepository};

    use super::PermissionAdminService;

    #[derive(Default)]
    struct FakeAuditRepository {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditRepository for FakeAuditRepository {
        async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

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

    fn admin() -> UserIdentity {
        UserIdentity::new("root", "Root Admin", None, Role::Admin)
    }

    fn service() -> (PermissionAdminService, Arc<FakeAuditRepository>) {
        let audit = Arc::new(FakeAuditRepository::default());
        let service =
            PermissionAdminService::new(Arc::new(FakeGrantRepository::default()), audit.clone());
        (service, audit)
    }

    #[tokio::test]
    async fn missing_grant_reads_as_all_deny_defaults() -> AppResult<()> {
        let (service, _) = service();
        let grant = service.permanent_grant_for(&admin(), "alice").await?;
        assert_eq!(grant, PermanentGrant::default());
        Ok(())
    }

    #[tokio::test]
    async fn non_privileged_actor_is_rejected() {
        let (service, _) = service();
        let user = UserIdentity::new("alice", "Alice", None, Role::User);
        assert!(service.permanent_grant_for(&user, "alice").await.is_err());
    }

    #[tokio::test]
    async fn set_grant_normalizes_and_audits() -> AppResult<()> {
        let (service, audit) = service();
        let stored = service
            .set_permanent_grant(
                &admin(),
                "alice",
                PermanentGrant {
                    write_access: WriteAccessMode::All,
                    buckets: BTreeSet::from(["stale".to_owned()]),
                    can_delete: true,
                },
            )
            .await?;

        assert!(stored.buckets.is_empty());
        assert_eq!(audit.events.lock().await.len(), 1);

        let fetched = service.permanent_grant_for(&admin(), "alice").await?;
        assert_eq!(fetched, stored);
        Ok(())
    }

    #[tokio::test]
    async fn selective_grant_with_invalid_bucket_is_rejected() {
        let (service, _) = service();
        let result = service
            .set_permanent_grant(
                &admin(),
                "alice",
                PermanentGrant {
                    write_access: WriteAccessMode::Selective,
                    buckets: BTreeSet::from(["bad bucket".to_owned()]),
                    can_delete: false,
                },
            )
            .await;
        assert!(result.is_err());
    }
}
