use std::collections::BTreeSet;
use std::str::FromStr;

use s3commander_core::AppError;
use serde::{Deserialize, Serialize};

use crate::BucketName;

/// Scope of a standing write grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAccessMode {
    /// No standing write access.
    None,
    /// Write access limited to an explicit bucket set.
    Selective,
    /// Write access to every bucket.
    All,
}

impl WriteAccessMode {
    /// Returns a stable storage value for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Selective => "selective",
            Self::All => "all",
        }
    }
}

impl FromStr for WriteAccessMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "selective" => Ok(Self::Selective),
            "all" => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown write access mode '{value}'"
            ))),
        }
    }
}

/// Standing per-user grant, at most one per principal.
///
/// Absence of a stored grant is equivalent to [`PermanentGrant::default`]:
/// no write access and no delete capability. `buckets` only carries meaning
/// when the mode is [`WriteAccessMode::Selective`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentGrant {
    /// Scope of the standing write grant.
    pub write_access: WriteAccessMode,
    /// Buckets covered when the mode is selective.
    pub buckets: BTreeSet<String>,
    /// Whether object deletion is enabled where write access applies.
    pub can_delete: bool,
}

impl PermanentGrant {
    /// Returns whether the standing grant covers writes to the bucket.
    #[must_use]
    pub fn allows_write(&self, bucket: &BucketName) -> bool {
        match self.write_access {
            WriteAccessMode::All => true,
            WriteAccessMode::Selective => self.buckets.contains(bucket.as_str()),
            WriteAccessMode::None => false,
        }
    }

    /// Returns whether the standing grant covers deletions in the bucket.
    ///
    /// Delete capability rides on standing write access for the same bucket;
    /// a delete-enabled grant with no applicable write scope deletes nothing.
    #[must_use]
    pub fn allows_delete(&self, bucket: &BucketName) -> bool {
        self.can_delete && self.allows_write(bucket)
    }

    /// Returns the grant with the bucket set cleared unless it is meaningful.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.write_access != WriteAccessMode::Selective {
            self.buckets.clear();
        }
        self
    }
}

impl Default for PermanentGrant {
    fn default() -> Self {
        Self {
            write_access: WriteAccessMode::None,
            buckets: BTreeSet::new(),
            can_delete: false,
        }
    }
}
