//! Domain types for bucket access brokering.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod bucket;
mod grant;
mod request;

pub use access::{AccessLevel, BucketAccess, Operation};
pub use audit::AuditAction;
pub use bucket::BucketName;
pub use grant::{PermanentGrant, WriteAccessMode};
pub use request::{
    AccessRequest, MIN_REVIEW_REASON_LENGTH, RequestId, RequestStatus, ReviewRecord,
    validate_review_reason,
};
