//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_resolver;
mod access_service;
mod account_ports;
mod account_service;
mod audit_ports;
mod audit_service;
mod directory_ports;
mod object_service;
mod permission_service;
mod request_service;
mod storage_ports;

use s3commander_core::{AppError, AppResult, UserIdentity};

pub use access_ports::{AccessRequestQuery, AccessRequestRepository, PermanentGrantRepository};
pub use access_resolver::{GrantSnapshot, resolve};
pub use access_service::{AccessService, AccessibleBuckets, GrantedBucket};
pub use account_ports::{Account, AccountRepository};
pub use account_service::AccountService;
pub use audit_ports::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};
pub use audit_service::AuditService;
pub use directory_ports::{DirectoryClient, DirectoryProfile};
pub use object_service::{BucketListing, ObjectService};
pub use permission_service::PermissionAdminService;
pub use request_service::{AccessRequestService, SubmitAccessRequestInput};
pub use storage_ports::{BucketSummary, ObjectStoreClient, ObjectSummary, PresignedUrl};

/// Rejects actors whose role does not bypass per-bucket grants.
pub(crate) fn require_privileged(actor: &UserIdentity) -> AppResult<()> {
    if !actor.is_privileged() {
        return Err(AppError::Forbidden(format!(
            "subject '{}' requires an administrative role for this operation",
            actor.subject()
        )));
    }

    Ok(())
}
