use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when an account is provisioned on first sign-in.
    AccountProvisioned,
    /// Emitted when an owner changes an account role.
    AccountRoleChanged,
    /// Emitted when a temporary access request is submitted.
    AccessRequestSubmitted,
    /// Emitted when a temporary access request is approved.
    AccessRequestApproved,
    /// Emitted when a temporary access request is denied.
    AccessRequestDenied,
    /// Emitted when an approved request is revoked.
    AccessRequestRevoked,
    /// Emitted when a standing permission record is replaced.
    PermanentGrantUpdated,
    /// Emitted when a download URL is issued.
    ObjectDownloaded,
    /// Emitted when an upload URL is issued.
    ObjectUploaded,
    /// Emitted when an object is deleted.
    ObjectDeleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountProvisioned => "account.provisioned",
            Self::AccountRoleChanged => "account.role.changed",
            Self::AccessRequestSubmitted => "access_request.submitted",
            Self::AccessRequestApproved => "access_request.approved",
            Self::AccessRequestDenied => "access_request.denied",
            Self::AccessRequestRevoked => "access_request.revoked",
            Self::PermanentGrantUpdated => "permission.permanent.updated",
            Self::ObjectDownloaded => "object.downloaded",
            Self::ObjectUploaded => "object.uploaded",
            Self::ObjectDeleted => "object.deleted",
        }
    }
}
