use std::str::FromStr;

use chrono::{DateTime, Utc};
use s3commander_core::AppError;
use serde::{Deserialize, Serialize};

/// Bucket operation kinds subject to access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Listing and downloading objects.
    Read,
    /// Uploading objects.
    Write,
    /// Deleting objects.
    Delete,
}

impl Operation {
    /// Returns a stable transport value for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::Read
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown operation value '{value}'"
            ))),
        }
    }
}

/// Effective read-access level for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AccessLevel {
    /// Standing access from role or permanent grant.
    Full,
    /// Time-bounded access from an approved request.
    Limited {
        /// Moment the backing grant stops being valid, when bounded.
        expires_at: Option<DateTime<Utc>>,
    },
    /// No access.
    None,
}

impl AccessLevel {
    /// Returns whether the level grants any read access.
    #[must_use]
    pub fn allows_read(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Effective access decision for one principal and bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAccess {
    /// Read-access level, with expiry for temporary grants.
    pub level: AccessLevel,
    /// Whether object uploads are allowed.
    pub can_write: bool,
    /// Whether object deletions are allowed.
    pub can_delete: bool,
}

impl BucketAccess {
    /// Decision granting every operation.
    #[must_use]
    pub fn full() -> Self {
        Self {
            level: AccessLevel::Full,
            can_write: true,
            can_delete: true,
        }
    }

    /// Decision granting nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            level: AccessLevel::None,
            can_write: false,
            can_delete: false,
        }
    }

    /// Returns whether the decision allows the given operation.
    #[must_use]
    pub fn allows(&self, operation: Operation) -> bool {
        match operation {
            Operation::Read => self.level.allows_read(),
            Operation::Write => self.can_write,
            Operation::Delete => self.can_delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{AccessLevel, BucketAccess, Operation};

    #[test]
    fn operation_defaults_to_read() {
        assert_eq!(Operation::default(), Operation::Read);
    }

    #[test]
    fn operation_roundtrip_transport_value() {
        let operation = Operation::Delete;
        let restored = Operation::from_str(operation.as_str());
        assert_eq!(restored.unwrap_or(Operation::Read), operation);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        assert!(Operation::from_str("list").is_err());
    }

    #[test]
    fn full_decision_allows_everything() {
        let access = BucketAccess::full();
        assert!(access.allows(Operation::Read));
        assert!(access.allows(Operation::Write));
        assert!(access.allows(Operation::Delete));
    }

    #[test]
    fn none_level_blocks_read() {
        assert!(!AccessLevel::None.allows_read());
        assert!(!BucketAccess::none().allows(Operation::Read));
    }
}
