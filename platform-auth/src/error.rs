//! Error types for authentication operations
//!
//! This module defines all error types that can occur while resolving a
//! request's auth context.

use thiserror::Error;

/// Authentication error types.
///
/// Every variant is terminal for the request that produced it: auth
/// failures are never retried, and a failed credential never falls back
/// to another scheme or to the development identity.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No verifiable credentials in a production runtime
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Bearer token has expired (or federated claims are past their expiry)
    #[error("Token has expired")]
    TokenExpired,

    /// Bearer token is invalid (malformed, bad signature, etc.)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Federated claims failed validation
    #[error("Invalid federated claims: {0}")]
    InvalidFederatedClaims(String),

    /// Credentials verified but lack a required claim
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Credential failures are expected traffic and should not be logged
    /// as server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Internal(_) | AuthError::ConfigError(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::AuthenticationRequired
            | AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::InvalidFederatedClaims(_)
            | AuthError::MissingClaim(_) => 401,

            AuthError::ConfigError(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::InvalidFederatedClaims(_) => "INVALID_FEDERATED_CLAIMS",
            AuthError::MissingClaim(_) => "MISSING_CLAIM",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
