use std::fmt::{Display, Formatter};

use s3commander_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted bucket name length.
pub const BUCKET_NAME_MAX_LENGTH: usize = 255;

/// A validated object-storage bucket name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketName(String);

impl BucketName {
    /// Creates a validated bucket name.
    ///
    /// Rejects empty or whitespace-only values and values containing
    /// whitespace, since neither can name a real bucket.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "bucket name must not be empty".to_owned(),
            ));
        }

        if trimmed.len() > BUCKET_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "bucket name must not exceed {BUCKET_NAME_MAX_LENGTH} characters"
            )));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "bucket name must not contain whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated bucket name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<BucketName> for String {
    fn from(value: BucketName) -> Self {
        value.0
    }
}

impl Display for BucketName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{BUCKET_NAME_MAX_LENGTH, BucketName};

    #[test]
    fn valid_bucket_name_is_accepted() {
        let bucket = BucketName::new("  finance-reports ");
        assert_eq!(bucket.map(String::from).as_deref(), Ok("finance-reports"));
    }

    #[test]
    fn empty_bucket_name_is_rejected() {
        assert!(BucketName::new("").is_err());
        assert!(BucketName::new("   ").is_err());
    }

    #[test]
    fn bucket_name_with_inner_whitespace_is_rejected() {
        assert!(BucketName::new("finance reports").is_err());
    }

    #[test]
    fn oversized_bucket_name_is_rejected() {
        let long = "b".repeat(BUCKET_NAME_MAX_LENGTH + 1);
        assert!(BucketName::new(long).is_err());
    }
}
