use s3commander_application::{BucketListing, ObjectSummary, PresignedUrl};
use s3commander_domain::{AccessLevel, BucketAccess, Operation};
use serde::Serialize;
use ts_rs::TS;

/// Effective access decision for one bucket.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bucket-access-response.ts"
)]
pub struct BucketAccessResponse {
    pub level: String,
    pub expires_at: Option<String>,
    pub can_write: bool,
    pub can_delete: bool,
}

impl From<BucketAccess> for BucketAccessResponse {
    fn from(access: BucketAccess) -> Self {
        let (level, expires_at) = match access.level {
            AccessLevel::Full => ("full", None),
            AccessLevel::Limited { expires_at } => {
                ("limited", expires_at.map(|moment| moment.to_rfc3339()))
            }
            AccessLevel::None => ("none", None),
        };

        Self {
            level: level.to_owned(),
            expires_at,
            can_write: access.can_write,
            can_delete: access.can_delete,
        }
    }
}

/// An access decision checked against one operation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bucket-access-decision-response.ts"
)]
pub struct BucketAccessDecisionResponse {
    pub operation: String,
    pub allowed: bool,
    pub access: BucketAccessResponse,
}

impl BucketAccessDecisionResponse {
    pub fn new(access: BucketAccess, operation: Operation) -> Self {
        Self {
            operation: operation.as_str().to_owned(),
            allowed: access.allows(operation),
            access: BucketAccessResponse::from(access),
        }
    }
}

/// A bucket the caller can reach, with its effective access.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bucket-listing-response.ts"
)]
pub struct BucketListingResponse {
    pub name: String,
    pub region: Option<String>,
    pub access: BucketAccessResponse,
}

impl From<BucketListing> for BucketListingResponse {
    fn from(listing: BucketListing) -> Self {
        Self {
            name: listing.name,
            region: listing.region,
            access: BucketAccessResponse::from(listing.access),
        }
    }
}

/// One object in a bucket listing.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/object-summary-response.ts"
)]
pub struct ObjectSummaryResponse {
    pub key: String,
    pub size_bytes: u64,
    pub last_modified: Option<String>,
}

impl From<ObjectSummary> for ObjectSummaryResponse {
    fn from(object: ObjectSummary) -> Self {
        Self {
            key: object.key,
            size_bytes: object.size_bytes,
            last_modified: object.last_modified.map(|moment| moment.to_rfc3339()),
        }
    }
}

/// A presigned transfer URL with its validity window.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/presigned-url-response.ts"
)]
pub struct PresignedUrlResponse {
    pub url: String,
    pub expires_at: String,
}

impl From<PresignedUrl> for PresignedUrlResponse {
    fn from(presigned: PresignedUrl) -> Self {
        Self {
            url: presigned.url,
            expires_at: presigned.expires_at.to_rfc3339(),
        }
    }
}
