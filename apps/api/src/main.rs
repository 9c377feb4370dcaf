//! S3 Commander API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use s3commander_application::{
    AccessRequestService, AccessService, AccountService, AuditService, DirectoryClient,
    ObjectService, PermissionAdminService,
};
use s3commander_core::AppError;
use s3commander_infrastructure::{
    HttpDirectoryClient, HttpObjectStoreClient, PostgresAccessRequestRepository,
    PostgresAccountRepository, PostgresAuditRepository, PostgresPermanentGrantRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let http_client = reqwest::Client::new();

    let grant_repository = Arc::new(PostgresPermanentGrantRepository::new(pool.clone()));
    let request_repository = Arc::new(PostgresAccessRequestRepository::new(pool.clone()));
    let account_repository = Arc::new(PostgresAccountRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let store_client = Arc::new(HttpObjectStoreClient::new(
        http_client.clone(),
        config.storage_gateway_url.clone(),
        config.storage_gateway_token.clone(),
    ));
    let directory_client: Arc<dyn DirectoryClient> = Arc::new(HttpDirectoryClient::new(
        http_client,
        config.directory_url.clone(),
    ));

    let access_service = AccessService::new(grant_repository.clone(), request_repository.clone());

    let app_state = AppState {
        access_service: access_service.clone(),
        request_service: AccessRequestService::new(
            request_repository,
            audit_repository.clone(),
        ),
        permission_service: PermissionAdminService::new(
            grant_repository,
            audit_repository.clone(),
        ),
        account_service: AccountService::new(account_repository, audit_repository.clone()),
        audit_service: AuditService::new(audit_repository.clone()),
        object_service: ObjectService::new(access_service, store_client, audit_repository),
        directory_client,
        frontend_url: config.frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route("/api/buckets", get(handlers::buckets::list_buckets_handler))
        .route(
            "/api/buckets/{bucket}/access",
            get(handlers::buckets::bucket_access_handler),
        )
        .route(
            "/api/buckets/{bucket}/objects",
            get(handlers::objects::list_objects_handler)
                .delete(handlers::objects::delete_object_handler),
        )
        .route(
            "/api/buckets/{bucket}/presign/download",
            post(handlers::objects::download_url_handler),
        )
        .route(
            "/api/buckets/{bucket}/presign/upload",
            post(handlers::objects::upload_url_handler),
        )
        .route(
            "/api/requests",
            get(handlers::requests::list_requests_handler)
                .post(handlers::requests::submit_request_handler),
        )
        .route(
            "/api/requests/{request_id}/approve",
            post(handlers::requests::approve_request_handler),
        )
        .route(
            "/api/requests/{request_id}/deny",
            post(handlers::requests::deny_request_handler),
        )
        .route(
            "/api/requests/{request_id}/revoke",
            post(handlers::requests::revoke_request_handler),
        )
        .route(
            "/api/admin/users",
            get(handlers::admin::list_accounts_handler),
        )
        .route(
            "/api/admin/users/{subject}/role",
            put(handlers::admin::change_role_handler),
        )
        .route(
            "/api/admin/permissions/{subject}",
            get(handlers::admin::permanent_grant_handler)
                .put(handlers::admin::save_permanent_grant_handler),
        )
        .route(
            "/api/security/audit-log",
            get(handlers::audit::list_audit_log_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/session", post(auth::establish_session_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "s3commander-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
