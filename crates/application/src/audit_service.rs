use std::sync::Arc;

use s3commander_core::{AppResult, UserIdentity};

use crate::audit_ports::{AuditLogEntry, AuditLogQuery, AuditLogRepository};
use crate::require_privileged;

/// Application service for administrative audit log views.
#[derive(Clone)]
pub struct AuditService {
    audit_log: Arc<dyn AuditLogRepository>,
}

impl AuditService {
    /// Creates a new audit service from a repository implementation.
    #[must_use]
    pub fn new(audit_log: Arc<dyn AuditLogRepository>) -> Self {
        Self { audit_log }
    }

    /// Lists recent audit entries. Privileged actors only.
    pub async fn list_entries(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        require_privileged(actor)?;
        self.audit_log.list_recent_entries(query).await
    }
}
