use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use s3commander_core::UserIdentity;

use crate::dto::{ObjectSummaryResponse, PresignedUrlResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ListObjectsQuery {
    pub prefix: Option<String>,
}

pub async fn list_objects_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bucket): Path<String>,
    Query(query): Query<ListObjectsQuery>,
) -> ApiResult<Json<Vec<ObjectSummaryResponse>>> {
    let objects = state
        .object_service
        .list_objects(&user, bucket.as_str(), query.prefix.as_deref())
        .await?
        .into_iter()
        .map(ObjectSummaryResponse::from)
        .collect();

    Ok(Json(objects))
}

#[derive(Debug, serde::Deserialize)]
pub struct ObjectKeyRequest {
    pub key: String,
}

pub async fn download_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bucket): Path<String>,
    Json(payload): Json<ObjectKeyRequest>,
) -> ApiResult<Json<PresignedUrlResponse>> {
    let url = state
        .object_service
        .download_url(&user, bucket.as_str(), payload.key.as_str())
        .await?;

    Ok(Json(PresignedUrlResponse::from(url)))
}

pub async fn upload_url_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bucket): Path<String>,
    Json(payload): Json<ObjectKeyRequest>,
) -> ApiResult<Json<PresignedUrlResponse>> {
    let url = state
        .object_service
        .upload_url(&user, bucket.as_str(), payload.key.as_str())
        .await?;

    Ok(Json(PresignedUrlResponse::from(url)))
}

#[derive(Debug, serde::Deserialize)]
pub struct DeleteObjectQuery {
    pub key: String,
}

pub async fn delete_object_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bucket): Path<String>,
    Query(query): Query<DeleteObjectQuery>,
) -> ApiResult<StatusCode> {
    state
        .object_service
        .delete_object(&user, bucket.as_str(), query.key.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
