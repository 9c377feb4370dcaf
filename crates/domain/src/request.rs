use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use s3commander_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::BucketName;

/// Minimum length for review reasons and justifications.
pub const MIN_REVIEW_REASON_LENGTH: usize = 10;

/// Validates a free-text review reason or justification.
pub fn validate_review_reason(reason: &str) -> AppResult<()> {
    if reason.trim().chars().count() < MIN_REVIEW_REASON_LENGTH {
        return Err(AppError::Validation(format!(
            "reason must be at least {MIN_REVIEW_REASON_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Unique identifier for an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a request identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| AppError::Validation(format!("invalid request id '{value}'")))
    }
}

/// Lifecycle state of an access request.
///
/// `Pending` moves to `Approved` or `Denied` exactly once; `Approved` may
/// additionally move to `Revoked`. `Denied` and `Revoked` are terminal.
/// Expiry is never a state: it is computed live against the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting an administrator decision.
    Pending,
    /// Granted, valid until the expiry timestamp.
    Approved,
    /// Rejected; terminal.
    Denied,
    /// Withdrawn after approval; terminal.
    Revoked,
}

impl RequestStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Revoked => "revoked",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            "revoked" => Ok(Self::Revoked),
            _ => Err(AppError::Validation(format!(
                "unknown request status '{value}'"
            ))),
        }
    }
}

/// Actor, moment, and reason captured with a review decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Subject of the reviewing administrator.
    pub actor_subject: String,
    /// Moment the decision was taken.
    pub at: DateTime<Utc>,
    /// Free-text reason, when one was supplied.
    pub reason: Option<String>,
}

/// A temporary access request for one principal and bucket.
///
/// Requester name and email are denormalized copies of the directory record
/// at submission time and can go stale relative to the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Stable request identifier.
    pub request_id: RequestId,
    /// Requesting principal subject.
    pub subject: String,
    /// Requester display name at submission time.
    pub requester_name: String,
    /// Requester email at submission time.
    pub requester_email: Option<String>,
    /// Requested bucket.
    pub bucket: BucketName,
    /// Bucket region label.
    pub region: String,
    /// Business justification supplied by the requester.
    pub justification: String,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Submission moment.
    pub requested_at: DateTime<Utc>,
    /// Expiry moment, present once approved.
    pub expires_at: Option<DateTime<Utc>>,
    /// Approval or denial record.
    pub decision: Option<ReviewRecord>,
    /// Revocation record.
    pub revocation: Option<ReviewRecord>,
}

impl AccessRequest {
    /// Creates a pending request submitted now.
    pub fn submit(
        subject: impl Into<String>,
        requester_name: impl Into<String>,
        requester_email: Option<String>,
        bucket: BucketName,
        region: impl Into<String>,
        justification: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let justification = justification.into();
        validate_review_reason(justification.as_str())?;

        Ok(Self {
            request_id: RequestId::new(),
            subject: subject.into(),
            requester_name: requester_name.into(),
            requester_email,
            bucket,
            region: region.into(),
            justification,
            status: RequestStatus::Pending,
            requested_at: now,
            expires_at: None,
            decision: None,
            revocation: None,
        })
    }

    /// Approves a pending request with an expiry `duration_minutes` from now.
    pub fn approve(
        &mut self,
        actor_subject: &str,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.require_status(RequestStatus::Pending, "approve")?;

        if duration_minutes == 0 {
            return Err(AppError::Validation(
                "approval duration_minutes must be greater than zero".to_owned(),
            ));
        }

        self.status = RequestStatus::Approved;
        self.expires_at = Some(now + Duration::minutes(i64::from(duration_minutes)));
        self.decision = Some(ReviewRecord {
            actor_subject: actor_subject.to_owned(),
            at: now,
            reason: None,
        });

        Ok(())
    }

    /// Denies a pending request.
    pub fn deny(&mut self, actor_subject: &str, reason: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.require_status(RequestStatus::Pending, "deny")?;
        validate_review_reason(reason)?;

        self.status = RequestStatus::Denied;
        self.decision = Some(ReviewRecord {
            actor_subject: actor_subject.to_owned(),
            at: now,
            reason: Some(reason.to_owned()),
        });

        Ok(())
    }

    /// Revokes an approved request, effective immediately.
    pub fn revoke(
        &mut self,
        actor_subject: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.require_status(RequestStatus::Approved, "revoke")?;
        validate_review_reason(reason)?;

        self.status = RequestStatus::Revoked;
        self.revocation = Some(ReviewRecord {
            actor_subject: actor_subject.to_owned(),
            at: now,
            reason: Some(reason.to_owned()),
        });

        Ok(())
    }

    /// Returns whether the request grants access at `now`.
    ///
    /// Only approved requests count, and only while the wall clock has not
    /// passed the expiry. A missing expiry on an approved row is treated as
    /// unexpired.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == RequestStatus::Approved
            && self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    fn require_status(&self, expected: RequestStatus, action: &str) -> AppResult<()> {
        if self.status != expected {
            return Err(AppError::Conflict(format!(
                "cannot {action} request '{}' in status '{}'",
                self.request_id,
                self.status.as_str()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use s3commander_core::AppResult;

    use super::{AccessRequest, RequestStatus, validate_review_reason};
    use crate::BucketName;

    fn pending_request() -> AppResult<AccessRequest> {
        AccessRequest::submit(
            "alice",
            "Alice Doe",
            Some("alice@example.com".to_owned()),
            BucketName::new("finance-reports")?,
            "eu-central-1",
            "quarterly reconciliation exports",
            Utc::now(),
        )
    }

    #[test]
    fn submit_starts_pending_without_expiry() -> AppResult<()> {
        let request = pending_request()?;
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.expires_at.is_none());
        assert!(!request.is_active(Utc::now()));
        Ok(())
    }

    #[test]
    fn short_justification_is_rejected() -> AppResult<()> {
        let result = AccessRequest::submit(
            "alice",
            "Alice Doe",
            None,
            BucketName::new("finance-reports")?,
            "eu-central-1",
            "because",
            Utc::now(),
        );
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn approve_sets_expiry_from_duration() -> AppResult<()> {
        let mut request = pending_request()?;
        let now = Utc::now();
        request.approve("admin", 60, now)?;

        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.expires_at, Some(now + Duration::minutes(60)));
        assert!(request.is_active(now));
        Ok(())
    }

    #[test]
    fn approve_rejects_zero_duration() -> AppResult<()> {
        let mut request = pending_request()?;
        assert!(request.approve("admin", 0, Utc::now()).is_err());
        assert_eq!(request.status, RequestStatus::Pending);
        Ok(())
    }

    #[test]
    fn approve_twice_is_a_conflict() -> AppResult<()> {
        let mut request = pending_request()?;
        request.approve("admin", 60, Utc::now())?;
        assert!(request.approve("admin", 60, Utc::now()).is_err());
        Ok(())
    }

    #[test]
    fn deny_requires_a_substantive_reason() -> AppResult<()> {
        let mut request = pending_request()?;
        assert!(request.deny("admin", "no", Utc::now()).is_err());
        assert_eq!(request.status, RequestStatus::Pending);

        request.deny("admin", "bucket holds restricted data", Utc::now())?;
        assert_eq!(request.status, RequestStatus::Denied);
        Ok(())
    }

    #[test]
    fn denied_request_is_terminal() -> AppResult<()> {
        let mut request = pending_request()?;
        request.deny("admin", "bucket holds restricted data", Utc::now())?;
        assert!(request.approve("admin", 60, Utc::now()).is_err());
        assert!(
            request
                .revoke("admin", "should not transition", Utc::now())
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn revoke_requires_prior_approval() -> AppResult<()> {
        let mut request = pending_request()?;
        assert!(
            request
                .revoke("admin", "engagement ended early", Utc::now())
                .is_err()
        );

        request.approve("admin", 60, Utc::now())?;
        request.revoke("admin", "engagement ended early", Utc::now())?;
        assert_eq!(request.status, RequestStatus::Revoked);
        Ok(())
    }

    #[test]
    fn revoked_request_is_inactive_despite_remaining_time() -> AppResult<()> {
        let mut request = pending_request()?;
        let now = Utc::now();
        request.approve("admin", 60, now)?;
        request.revoke("admin", "engagement ended early", now)?;
        assert!(!request.is_active(now));
        Ok(())
    }

    #[test]
    fn approved_request_expires_by_clock_not_by_status() -> AppResult<()> {
        let mut request = pending_request()?;
        let now = Utc::now();
        request.approve("admin", 60, now)?;

        let after_expiry = now + Duration::minutes(61);
        assert_eq!(request.status, RequestStatus::Approved);
        assert!(!request.is_active(after_expiry));
        Ok(())
    }

    proptest! {
        #[test]
        fn reason_length_gate_counts_characters(padding in 0usize..40) {
            let reason = "x".repeat(padding);
            let validated = validate_review_reason(reason.as_str());
            prop_assert_eq!(validated.is_ok(), padding >= super::MIN_REVIEW_REASON_LENGTH);
        }
    }
}
