use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use s3commander_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use s3commander_domain::{AccessRequest, AuditAction, BucketName, RequestId};

use crate::access_ports::{AccessRequestQuery, AccessRequestRepository};
use crate::audit_ports::{AuditEvent, AuditRepository};
use crate::require_privileged;

/// Input payload for submitting a temporary access request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAccessRequestInput {
    /// Requested bucket name.
    pub bucket: String,
    /// Bucket region label.
    pub region: String,
    /// Business justification.
    pub justification: String,
}

/// Application service for the temporary access request workflow.
#[derive(Clone)]
pub struct AccessRequestService {
    repository: Arc<dyn AccessRequestRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AccessRequestService {
    /// Creates a new request service from repository implementations.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AccessRequestRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            audit_repository,
        }
    }

    /// Submits a new pending request for the acting identity.
    pub async fn submit(
        &self,
        actor: &UserIdentity,
        input: SubmitAccessRequestInput,
    ) -> AppResult<AccessRequest> {
        let bucket = BucketName::new(input.bucket)?;
        let region = NonEmptyString::new(input.region)?;

        if self
            .repository
            .find_pending_for_bucket(actor.subject(), &bucket)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "a pending request for bucket '{bucket}' already exists"
            )));
        }

        let request = AccessRequest::submit(
            actor.subject(),
            actor.display_name(),
            actor.email().map(ToOwned::to_owned),
            bucket,
            String::from(region),
            input.justification,
            Utc::now(),
        )?;
        self.repository.create(&request).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor_subject: actor.subject().to_owned(),
                actor_name: actor.display_name().to_owned(),
                action: AuditAction::AccessRequestSubmitted,
                resource_type: "access_request".to_owned(),
                resource_id: request.request_id.to_string(),
                detail: Some(format!(
                    "requested temporary access to '{}' in '{}'",
                    request.bucket, request.region
                )),
            })
            .await?;

        Ok(request)
    }

    /// Approves a pending request with an expiry window in minutes.
    pub async fn approve(
        &self,
        actor: &UserIdentity,
        request_id: &str,
        duration_minutes: u32,
    ) -> AppResult<AccessRequest> {
        require_privileged(actor)?;

        let mut request = self.load(request_id).await?;
        request.approve(actor.subject(), duration_minutes, Utc::now())?;
        self.repository.update(&request).await?;

        let expires_label = request
            .expires_at
            .map(|expires_at| expires_at.to_rfc3339())
            .unwrap_or_default();
        self.append_review_event(
            actor,
            &request,
            AuditAction::AccessRequestApproved,
            format!(
                "approved access to '{}' for '{}' until '{expires_label}'",
                request.bucket, request.subject
            ),
        )
        .await?;

        Ok(request)
    }

    /// Denies a pending request.
    pub async fn deny(
        &self,
        actor: &UserIdentity,
        request_id: &str,
        reason: &str,
    ) -> AppResult<AccessRequest> {
        require_privileged(actor)?;

        let mut request = self.load(request_id).await?;
        request.deny(actor.subject(), reason, Utc::now())?;
        self.repository.update(&request).await?;

        self.append_review_event(
            actor,
            &request,
            AuditAction::AccessRequestDenied,
            format!(
                "denied access to '{}' for '{}': {reason}",
                request.bucket, request.subject
            ),
        )
        .await?;

        Ok(request)
    }

    /// Revokes an approved request, effective immediately.
    pub async fn revoke(
        &self,
        actor: &UserIdentity,
        request_id: &str,
        reason: &str,
    ) -> AppResult<AccessRequest> {
        require_privileged(actor)?;

        let mut request = self.load(request_id).await?;
        request.revoke(actor.subject(), reason, Utc::now())?;
        self.repository.update(&request).await?;

        self.append_review_event(
            actor,
            &request,
            AuditAction::AccessRequestRevoked,
            format!(
                "revoked access to '{}' for '{}': {reason}",
                request.bucket, request.subject
            ),
        )
        .await?;

        Ok(request)
    }

    /// Lists requests; non-privileged actors only see their own.
    pub async fn list(
        &self,
        actor: &UserIdentity,
        mut query: AccessRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        if !actor.is_privileged() {
            query.subject = Some(actor.subject().to_owned());
        }

        self.repository.list(query).await
    }

    async fn load(&self, request_id: &str) -> AppResult<AccessRequest> {
        let request_id = RequestId::from_str(request_id)?;
        self.repository
            .find(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("access request '{request_id}' not found")))
    }

    async fn append_review_event(
        &self,
        actor: &UserIdentity,
        request: &AccessRequest,
        action: AuditAction,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor_subject: actor.subject().to_owned(),
                actor_name: actor.display_name().to_owned(),
                action,
                resource_type: "access_request".to_owned(),
                resource_id: request.request_id.to_string(),
                detail: Some(detail),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use s3commander_core::{AppResult, Role, UserIdentity};
    use s3commander_domain::{AccessRequest, BucketName, RequestId, RequestStatus};
    use tokio::sync::Mutex;

    use crate::access_ports::{AccessRequestQuery, AccessRequestRepository};
    use crate::audit_ports::{AuditEvent, AuditRepository};

    use super::{AccessRequestService, SubmitAccessRequestInput};

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

    fn requester() -> UserIdentity {
        UserIdentity::new(
            "alice",
            "Alice Doe",
            Some("alice@example.com".to_owned()),
            Role::User,
        )
    }

    fn admin() -> UserIdentity {
        UserIdentity::new("root", "Root Admin", None, Role::Admin)
    }

    fn submit_input(bucket: &str) -> SubmitAccessRequestInput {
        SubmitAccessRequestInput {
            bucket: bucket.to_owned(),
            region: "eu-central-1".to_owned(),
            justification: "quarterly reconciliation exports".to_owned(),
        }
    }

    fn service() -> (AccessRequestService, Arc<FakeAuditRepository>) {
        let audit = Arc::new(FakeAuditRepository::default());
        let service =
            AccessRequestService::new(Arc::new(FakeRequestRepository::default()), audit.clone());
        (service, audit)
    }

    #[tokio::test]
    async fn submit_denormalizes_requester_profile_and_audits() -> AppResult<()> {
        let (service, audit) = service();
        let request = service.submit(&requester(), submit_input("b1")).await?;

        assert_eq!(request.requester_name, "Alice Doe");
        assert_eq!(request.requester_email.as_deref(), Some("alice@example.com"));
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(audit.events.lock().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_pending_request_is_a_conflict() -> AppResult<()> {
        let (service, _) = service();
        service.submit(&requester(), submit_input("b1")).await?;
        let duplicate = service.submit(&requester(), submit_input("b1")).await;
        assert!(duplicate.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn approve_requires_a_privileged_actor() -> AppResult<()> {
        let (service, _) = service();
        let request = service.submit(&requester(), submit_input("b1")).await?;

        let result = service
            .approve(&requester(), request.request_id.to_string().as_str(), 60)
            .await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn approve_sets_expiry_and_appends_audit_event() -> AppResult<()> {
        let (service, audit) = service();
        let request = service.submit(&requester(), submit_input("b1")).await?;

        let approved = service
            .approve(&admin(), request.request_id.to_string().as_str(), 60)
            .await?;
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(approved.expires_at.is_some());
        assert_eq!(audit.events.lock().await.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn deny_rejects_a_short_reason() -> AppResult<()> {
        let (service, _) = service();
        let request = service.submit(&requester(), submit_input("b1")).await?;

        let result = service
            .deny(&admin(), request.request_id.to_string().as_str(), "no")
            .await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn revoke_requires_prior_approval() -> AppResult<()> {
        let (service, _) = service();
        let request = service.submit(&requester(), submit_input("b1")).await?;
        let id = request.request_id.to_string();

        let premature = service
            .revoke(&admin(), id.as_str(), "engagement ended early")
            .await;
        assert!(premature.is_err());

        service.approve(&admin(), id.as_str(), 60).await?;
        let revoked = service
            .revoke(&admin(), id.as_str(), "engagement ended early")
            .await?;
        assert_eq!(revoked.status, RequestStatus::Revoked);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_request_id_is_not_found() {
        let (service, _) = service();
        let result = service
            .approve(&admin(), "8f7f4f5e-0000-0000-0000-000000000000", 60)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_actor_unless_privileged() -> AppResult<()> {
        let (service, _) = service();
        service.submit(&requester(), submit_input("b1")).await?;
        let other = UserIdentity::new("bob", "Bob", None, Role::User);
        service.submit(&other, submit_input("b2")).await?;

        let query = AccessRequestQuery {
            subject: None,
            status: None,
            limit: 50,
            offset: 0,
        };
        let own = service.list(&requester(), query.clone()).await?;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].subject, "alice");

        let all = service.list(&admin(), query).await?;
        assert_eq!(all.len(), 2);
        Ok(())
    }
}
