use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use s3commander_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{EstablishSessionRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Session key holding the authenticated identity.
pub const SESSION_USER_KEY: &str = "authenticated_user";

pub async fn establish_session_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<EstablishSessionRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let profile = state
        .directory_client
        .verify_session_token(payload.token.as_str())
        .await?;

    let account = state.account_service.ensure_account(profile).await?;
    let identity = UserIdentity::new(
        account.subject,
        account.display_name,
        account.email,
        account.role,
    );

    session
        .insert(SESSION_USER_KEY, identity.clone())
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    Ok(Json(UserIdentityResponse::from(identity)))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(session: Session) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(UserIdentityResponse::from(identity)))
}
