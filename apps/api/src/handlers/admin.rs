use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use s3commander_core::{Role, UserIdentity};
use s3commander_domain::{PermanentGrant, WriteAccessMode};

use crate::dto::{
    AccountResponse, ChangeRoleRequest, PermanentGrantResponse, SavePermanentGrantRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_accounts_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let accounts = state
        .account_service
        .list_accounts(&user)
        .await?
        .into_iter()
        .map(AccountResponse::from)
        .collect();

    Ok(Json(accounts))
}

pub async fn change_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Json(payload): Json<ChangeRoleRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let role = Role::from_str(payload.role.as_str())?;
    let account = state
        .account_service
        .change_role(&user, subject.as_str(), role)
        .await?;

    Ok(Json(AccountResponse::from(account)))
}

pub async fn permanent_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
) -> ApiResult<Json<PermanentGrantResponse>> {
    let grant = state
        .permission_service
        .permanent_grant_for(&user, subject.as_str())
        .await?;

    Ok(Json(PermanentGrantResponse::from(grant)))
}

pub async fn save_permanent_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Json(payload): Json<SavePermanentGrantRequest>,
) -> ApiResult<Json<PermanentGrantResponse>> {
    let grant = PermanentGrant {
        write_access: WriteAccessMode::from_str(payload.write_access.as_str())?,
        buckets: payload.buckets.into_iter().collect(),
        can_delete: payload.can_delete,
    };

    let saved = state
        .permission_service
        .set_permanent_grant(&user, subject.as_str(), grant)
        .await?;

    Ok(Json(PermanentGrantResponse::from(saved)))
}
