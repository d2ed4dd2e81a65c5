//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy.
///
/// Repository errors convert into exactly one of these kinds so callers can
/// distinguish malformed input, missing resources, ownership failures, and
/// retryable lock contention without a generic catch-all.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input (non-positive amount, unknown tag, bad scale).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced resource does not exist or is soft-deleted.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource exists but is not owned by the acting user.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Lock acquisition timed out or was chosen as a deadlock victim.
    /// Retryable by the caller; the engine never retries on its own.
    #[error("Lock contention: {0}")]
    LockTimeout(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::LockTimeout(_) => "LOCK_TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the operation can be safely retried by the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::PermissionDenied(String::new()).error_code(),
            "PERMISSION_DENIED"
        );
        assert_eq!(
            AppError::LockTimeout(String::new()).error_code(),
            "LOCK_TIMEOUT"
        );
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_only_lock_timeout_is_retryable() {
        assert!(AppError::LockTimeout(String::new()).is_retryable());
        assert!(!AppError::Validation(String::new()).is_retryable());
        assert!(!AppError::NotFound(String::new()).is_retryable());
        assert!(!AppError::PermissionDenied(String::new()).is_retryable());
        assert!(!AppError::Database(String::new()).is_retryable());
        assert!(!AppError::Internal(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("amount must be positive".into()).to_string(),
            "Validation error: amount must be positive"
        );
        assert_eq!(
            AppError::NotFound("account".into()).to_string(),
            "Not found: account"
        );
        assert_eq!(
            AppError::LockTimeout("account row".into()).to_string(),
            "Lock contention: account row"
        );
    }
}
