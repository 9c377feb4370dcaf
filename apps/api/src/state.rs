use std::sync::Arc;

use s3commander_application::{
    AccessRequestService, AccessService, AccountService, AuditService, DirectoryClient,
    ObjectService, PermissionAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub request_service: AccessRequestService,
    pub permission_service: PermissionAdminService,
    pub account_service: AccountService,
    pub audit_service: AuditService,
    pub object_service: ObjectService,
    pub directory_client: Arc<dyn DirectoryClient>,
    pub frontend_url: String,
}
