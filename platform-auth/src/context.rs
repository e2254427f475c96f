//! Request auth context
//!
//! This module defines the per-request identity the resolver produces.
//! An auth context is constructed once per request and discarded when the
//! request completes; it is never persisted.

use platform_tenant::TenantRole;
use serde::{Deserialize, Serialize};

/// The resolved identity a request acts under.
///
/// # Examples
///
/// ```
/// use platform_auth::{AuthContext, AuthMethod};
/// use platform_tenant::TenantRole;
///
/// let ctx = AuthContext::new("tn_acme", "user-1", TenantRole::Member, AuthMethod::Bearer);
/// assert!(!ctx.is_dev_fallback());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Tenant the request is scoped to
    pub tenant_id: String,

    /// Acting user
    pub user_id: String,

    /// The user's role within the tenant
    pub role: TenantRole,

    /// Which credential scheme produced this context
    pub auth_method: AuthMethod,
}

impl AuthContext {
    /// Create a new auth context.
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        role: TenantRole,
        auth_method: AuthMethod,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            role,
            auth_method,
        }
    }

    /// Whether this is the development-only identity.
    ///
    /// The resolver never produces such a context in a production
    /// runtime.
    pub fn is_dev_fallback(&self) -> bool {
        self.auth_method == AuthMethod::DevFallback
    }
}

/// Which credential scheme produced an auth context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Platform-issued bearer JWT
    Bearer,

    /// Federated claims forwarded by the gateway authorizer
    Federated,

    /// Fixed development-only identity (non-production runtimes only)
    DevFallback,
}

impl AuthMethod {
    /// Get string representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Bearer => "bearer",
            AuthMethod::Federated => "federated",
            AuthMethod::DevFallback => "dev_fallback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = AuthContext::new("tn_acme", "user-1", TenantRole::Admin, AuthMethod::Federated);

        assert_eq!(ctx.tenant_id, "tn_acme");
        assert_eq!(ctx.user_id, "user-1");
        assert_eq!(ctx.role, TenantRole::Admin);
        assert!(!ctx.is_dev_fallback());
    }

    #[test]
    fn test_dev_fallback_detection() {
        let ctx = AuthContext::new(
            "local-dev-tenant",
            "local-dev-user",
            TenantRole::Owner,
            AuthMethod::DevFallback,
        );
        assert!(ctx.is_dev_fallback());
    }

    #[test]
    fn test_method_strings() {
        assert_eq!(AuthMethod::Bearer.as_str(), "bearer");
        assert_eq!(AuthMethod::DevFallback.as_str(), "dev_fallback");
    }
}
