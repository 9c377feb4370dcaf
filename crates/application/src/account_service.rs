use std::sync::Arc;

use chrono::Utc;
use s3commander_core::{AppError, AppResult, Role, UserIdentity};
use s3commander_domain::AuditAction;

use crate::account_ports::{Account, AccountRepository};
use crate::audit_ports::{AuditEvent, AuditRepository};
use crate::directory_ports::DirectoryProfile;
use crate::require_privileged;

/// Application service for account provisioning and role administration.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AccountService {
    /// Creates a new account service from repository implementations.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            accounts,
            audit_repository,
        }
    }

    /// Provisions or refreshes the account behind a directory profile.
    ///
    /// The first account ever created becomes the owner; every later account
    /// starts as a regular user. Existing accounts get their denormalized
    /// profile fields refreshed but keep their stored role.
    pub async fn ensure_account(&self, profile: DirectoryProfile) -> AppResult<Account> {
        if let Some(mut existing) = self.accounts.find_by_subject(&profile.subject).await? {
            if existing.display_name != profile.display_name || existing.email != profile.email {
                self.accounts
                    .update_profile(
                        &profile.subject,
                        &profile.display_name,
                        profile.email.as_deref(),
                    )
                    .await?;
                existing.display_name = profile.display_name;
                existing.email = profile.email;
            }

            return Ok(existing);
        }

        let role = if self.accounts.count().await? == 0 {
            Role::Owner
        } else {
            Role::User
        };

        let account = Account {
            subject: profile.subject,
            display_name: profile.display_name,
            email: profile.email,
            role,
            created_at: Utc::now(),
        };
        self.accounts.insert(&account).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor_subject: account.subject.clone(),
                actor_name: account.display_name.clone(),
                action: AuditAction::AccountProvisioned,
                resource_type: "account".to_owned(),
                resource_id: account.subject.clone(),
                detail: Some(format!("provisioned with role '{}'", role.as_str())),
            })
            .await?;

        Ok(account)
    }

    /// Lists all portal accounts.
    pub async fn list_accounts(&self, actor: &UserIdentity) -> AppResult<Vec<Account>> {
        require_privileged(actor)?;
        self.accounts.list().await
    }

    /// Changes the role of an account. Owners only.
    pub async fn change_role(
        &self,
        actor: &UserIdentity,
        subject: &str,
        new_role: Role,
    ) -> AppResult<Account> {
        if actor.role() != Role::Owner {
            return Err(AppError::Forbidden(
                "only owners may change account roles".to_owned(),
            ));
        }

        let mut account = self
            .accounts
            .find_by_subject(subject)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{subject}' not found")))?;

        if account.role == new_role {
            return Ok(account);
        }

        if account.role == Role::Owner
            && new_role != Role::Owner
            && self.accounts.count_with_role(Role::Owner).await? <= 1
        {
            return Err(AppError::Conflict(
                "cannot demote the last remaining owner".to_owned(),
            ));
        }

        let previous_role = account.role;
        self.accounts.update_role(subject, new_role).await?;
        account.role = new_role;

        self.audit_repository
            .append_event(AuditEvent {
                actor_subject: actor.subject().to_owned(),
                actor_name: actor.display_name().to_owned(),
                action: AuditAction::AccountRoleChanged,
                resource_type: "account".to_owned(),
                resource_id: subject.to_owned(),
                detail: Some(format!(
                    "changed role from '{}' to '{}'",
                    previous_role.as_str(),
                    new_role.as_str()
                )),
            })
            .await?;

        Ok(account)
    }
}
