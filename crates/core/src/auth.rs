use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Global account role assigned at provisioning time.
///
/// `Owner` and `Admin` are treated identically by access checks; both bypass
/// per-bucket grants entirely. The distinction only matters for account
/// administration, where role changes are reserved to owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative control, including role management.
    Owner,
    /// Full bucket and grant administration.
    Admin,
    /// Regular user subject to permanent and temporary grants.
    User,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Returns whether this role bypasses per-bucket grant checks.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// User information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
    role: Role,
}

impl UserIdentity {
    /// Creates a user identity from directory and account data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            role,
        }
    }

    /// Returns the stable subject claim from the directory service.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the directory returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the account role linked to the identity.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the identity bypasses per-bucket grant checks.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}
