use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use s3commander_application::SubmitAccessRequestInput;
use s3commander_core::UserIdentity;
use s3commander_domain::RequestStatus;

use crate::dto::{
    AccessRequestResponse, ApproveAccessRequestRequest, ReviewAccessRequestRequest,
    SubmitAccessRequestRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ListRequestsQuery {
    pub subject: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn list_requests_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<ListRequestsQuery>,
) -> ApiResult<Json<Vec<AccessRequestResponse>>> {
    let status = query
        .status
        .map(|value| RequestStatus::from_str(value.as_str()))
        .transpose()?;

    let requests = state
        .request_service
        .list(
            &user,
            s3commander_application::AccessRequestQuery {
                subject: query.subject,
                status,
                limit: query.limit.unwrap_or(50),
                offset: query.offset.unwrap_or(0),
            },
        )
        .await?
        .into_iter()
        .map(AccessRequestResponse::from)
        .collect();

    Ok(Json(requests))
}

pub async fn submit_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SubmitAccessRequestRequest>,
) -> ApiResult<(StatusCode, Json<AccessRequestResponse>)> {
    let request = state
        .request_service
        .submit(
            &user,
            SubmitAccessRequestInput {
                bucket: payload.bucket,
                region: payload.region,
                justification: payload.justification,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AccessRequestResponse::from(request))))
}

pub async fn approve_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<String>,
    Json(payload): Json<ApproveAccessRequestRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state
        .request_service
        .approve(&user, request_id.as_str(), payload.duration_minutes)
        .await?;

    Ok(Json(AccessRequestResponse::from(request)))
}

pub async fn deny_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<String>,
    Json(payload): Json<ReviewAccessRequestRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state
        .request_service
        .deny(&user, request_id.as_str(), payload.reason.as_str())
        .await?;

    Ok(Json(AccessRequestResponse::from(request)))
}

pub async fn revoke_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<String>,
    Json(payload): Json<ReviewAccessRequestRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state
        .request_service
        .revoke(&user, request_id.as_str(), payload.reason.as_str())
        .await?;

    Ok(Json(AccessRequestResponse::from(request)))
}
