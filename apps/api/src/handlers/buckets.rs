use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use s3commander_core::UserIdentity;
use s3commander_domain::Operation;

use crate::dto::{BucketAccessDecisionResponse, BucketListingResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_buckets_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<BucketListingResponse>>> {
    let buckets = state
        .object_service
        .list_buckets(&user)
        .await?
        .into_iter()
        .map(BucketListingResponse::from)
        .collect();

    Ok(Json(buckets))
}

#[derive(Debug, serde::Deserialize)]
pub struct BucketAccessQuery {
    pub operation: Option<String>,
}

pub async fn bucket_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(bucket): Path<String>,
    Query(query): Query<BucketAccessQuery>,
) -> ApiResult<Json<BucketAccessDecisionResponse>> {
    let operation = query
        .operation
        .map(|value| Operation::from_str(value.as_str()))
        .transpose()?
        .unwrap_or_default();

    let access = state.access_service.evaluate(&user, bucket.as_str()).await?;

    Ok(Json(BucketAccessDecisionResponse::new(access, operation)))
}
