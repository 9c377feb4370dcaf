//! Infrastructure adapters: PostgreSQL repositories and HTTP clients.

#![forbid(unsafe_code)]

mod http_directory_client;
mod http_object_store;
mod postgres_access_request_repository;
mod postgres_account_repository;
mod postgres_audit_repository;
mod postgres_permanent_grant_repository;

pub use http_directory_client::HttpDirectoryClient;
pub use http_object_store::HttpObjectStoreClient;
pub use postgres_access_request_repository::PostgresAccessRequestRepository;
pub use postgres_account_repository::PostgresAccountRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_permanent_grant_repository::PostgresPermanentGrantRepository;
