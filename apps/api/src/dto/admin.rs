use s3commander_application::Account;
use s3commander_domain::PermanentGrant;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a portal account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-response.ts"
)]
pub struct AccountResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            subject: account.subject,
            display_name: account.display_name,
            email: account.email,
            role: account.role.as_str().to_owned(),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for changing an account role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-role-request.ts"
)]
pub struct ChangeRoleRequest {
    pub role: String,
}

/// API representation of a standing per-user permission record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permanent-grant-response.ts"
)]
pub struct PermanentGrantResponse {
    pub write_access: String,
    pub buckets: Vec<String>,
    pub can_delete: bool,
}

impl From<PermanentGrant> for PermanentGrantResponse {
    fn from(grant: PermanentGrant) -> Self {
        Self {
            write_access: grant.write_access.as_str().to_owned(),
            buckets: grant.buckets.into_iter().collect(),
            can_delete: grant.can_delete,
        }
    }
}

/// Request payload for replacing a standing permission record.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-permanent-grant-request.ts"
)]
pub struct SavePermanentGrantRequest {
    pub write_access: String,
    pub buckets: Vec<String>,
    pub can_delete: bool,
}
