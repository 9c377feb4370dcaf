mod access;
mod admin;
mod audit;
mod auth;
mod common;
mod requests;

pub use access::{
    BucketAccessDecisionResponse, BucketAccessResponse, BucketListingResponse,
    ObjectSummaryResponse, PresignedUrlResponse,
};
pub use admin::{
    AccountResponse, ChangeRoleRequest, PermanentGrantResponse, SavePermanentGrantRequest,
};
pub use audit::AuditLogEntryResponse;
pub use auth::EstablishSessionRequest;
pub use common::{HealthResponse, UserIdentityResponse};
pub use requests::{
    AccessRequestResponse, ApproveAccessRequestRequest, ReviewAccessRequestRequest,
    ReviewRecordResponse, SubmitAccessRequestRequest,
};

#[cfg(test)]
mod tests {
    use super::{
        AccessRequestResponse, AccountResponse, ApproveAccessRequestRequest,
        AuditLogEntryResponse, BucketAccessDecisionResponse, BucketAccessResponse,
        BucketListingResponse, ChangeRoleRequest, EstablishSessionRequest, HealthResponse,
        ObjectSummaryResponse, PermanentGrantResponse, PresignedUrlResponse,
        ReviewAccessRequestRequest, ReviewRecordResponse, SavePermanentGrantRequest,
        SubmitAccessRequestRequest, UserIdentityResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        EstablishSessionRequest::export(&config)?;
        SubmitAccessRequestRequest::export(&config)?;
        ApproveAccessRequestRequest::export(&config)?;
        ReviewAccessRequestRequest::export(&config)?;
        ChangeRoleRequest::export(&config)?;
        SavePermanentGrantRequest::export(&config)?;
        HealthResponse::export(&config)?;
        UserIdentityResponse::export(&config)?;
        BucketAccessResponse::export(&config)?;
        BucketAccessDecisionResponse::export(&config)?;
        BucketListingResponse::export(&config)?;
        ObjectSummaryResponse::export(&config)?;
        PresignedUrlResponse::export(&config)?;
        ReviewRecordResponse::export(&config)?;
        AccessRequestResponse::export(&config)?;
        AccountResponse::export(&config)?;
        PermanentGrantResponse::export(&config)?;
        AuditLogEntryResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }
}
