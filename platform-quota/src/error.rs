//! Error types for quota operations

use thiserror::Error;

/// Errors surfaced by a quota store implementation.
///
/// Transport-level failures (`Timeout`, `Unavailable`) are mapped to a
/// fail-closed denial by the enforcer; they never turn into an optimistic
/// allow.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the tenant
    #[error("Tenant record not found")]
    NotFound,

    /// A record already exists for the tenant
    #[error("Tenant record already exists")]
    AlreadyExists,

    /// The store did not answer in time
    #[error("Store operation timed out")]
    Timeout,

    /// Transport or server failure
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded
    #[error("Record serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the quota enforcer.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The tenant has no record; the caller distinguishes this from an
    /// over-quota denial
    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    /// A store failure on a path with no fail-closed decision to return
    /// (admin and release operations)
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for enforcer operations.
pub type QuotaResult<T> = Result<T, QuotaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::NotFound.to_string(), "Tenant record not found");
        assert_eq!(
            StoreError::Unavailable("connection refused".into()).to_string(),
            "Store unavailable: connection refused"
        );
    }

    #[test]
    fn test_quota_error_from_store_error() {
        let err: QuotaError = StoreError::Timeout.into();
        assert!(matches!(err, QuotaError::Store(StoreError::Timeout)));
    }
}
