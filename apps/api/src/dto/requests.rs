use s3commander_domain::{AccessRequest, ReviewRecord};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Request payload for submitting a temporary access request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-access-request-request.ts"
)]
pub struct SubmitAccessRequestRequest {
    pub bucket: String,
    pub region: String,
    pub justification: String,
}

/// Request payload for approving a pending access request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/approve-access-request-request.ts"
)]
pub struct ApproveAccessRequestRequest {
    pub duration_minutes: u32,
}

/// Request payload for denying or revoking an access request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/review-access-request-request.ts"
)]
pub struct ReviewAccessRequestRequest {
    pub reason: String,
}

/// A recorded review decision.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/review-record-response.ts"
)]
pub struct ReviewRecordResponse {
    pub actor_subject: String,
    pub at: String,
    pub reason: Option<String>,
}

impl From<ReviewRecord> for ReviewRecordResponse {
    fn from(record: ReviewRecord) -> Self {
        Self {
            actor_subject: record.actor_subject,
            at: record.at.to_rfc3339(),
            reason: record.reason,
        }
    }
}

/// API representation of a temporary access request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-request-response.ts"
)]
pub struct AccessRequestResponse {
    pub id: String,
    pub subject: String,
    pub requester_name: String,
    pub requester_email: Option<String>,
    pub bucket: String,
    pub region: String,
    pub justification: String,
    pub status: String,
    pub requested_at: String,
    pub expires_at: Option<String>,
    pub decision: Option<ReviewRecordResponse>,
    pub revocation: Option<ReviewRecordResponse>,
}

impl From<AccessRequest> for AccessRequestResponse {
    fn from(request: AccessRequest) -> Self {
        Self {
            id: request.request_id.to_string(),
            subject: request.subject,
            requester_name: request.requester_name,
            requester_email: request.requester_email,
            bucket: request.bucket.to_string(),
            region: request.region,
            justification: request.justification,
            status: request.status.as_str().to_owned(),
            requested_at: request.requested_at.to_rfc3339(),
            expires_at: request.expires_at.map(|moment| moment.to_rfc3339()),
            decision: request.decision.map(ReviewRecordResponse::from),
            revocation: request.revocation.map(ReviewRecordResponse::from),
        }
    }
}
