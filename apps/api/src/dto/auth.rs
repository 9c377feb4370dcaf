use serde::Deserialize;
use ts_rs::TS;

/// Request payload for exchanging a directory token for a portal session.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/establish-session-request.ts"
)]
pub struct EstablishSessionRequest {
    pub token: String,
}
