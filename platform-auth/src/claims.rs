//! Credential claims
//!
//! This module defines the claim structures for the two credential schemes
//! a request can carry: a platform-issued bearer JWT, or a claim map
//! forwarded by the hosting gateway's federated-identity authorizer.

use chrono::{DateTime, Utc};
use platform_tenant::TenantRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Claims carried by a platform-issued bearer token.
///
/// Standard JWT claims (RFC 7519) plus the tenant-scoping claims the
/// request handlers need. A token whose signature verifies but which lacks
/// `tenant_id` is invalid: claim extraction never substitutes a default
/// tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience (allowed apps)
    pub aud: Vec<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Tenant the subject is acting within
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Role within the tenant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl TenantClaims {
    /// Create new claims for a user acting within a tenant.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The subject
    /// * `tenant_id` - The tenant the token is scoped to
    /// * `role` - The subject's role within the tenant
    /// * `duration` - Token validity duration
    /// * `issuer` - Token issuer
    /// * `audience` - Allowed audiences
    pub fn new(
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        role: TenantRole,
        duration: chrono::Duration,
        issuer: impl Into<String>,
        audience: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        let exp = now + duration;

        Self {
            sub: user_id.into(),
            iss: issuer.into(),
            aud: audience,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            tenant_id: Some(tenant_id.into()),
            role: Some(role.as_str().to_string()),
        }
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Get expiration as DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// The subject's role, mapped to the least-privileged role when the
    /// claim is missing or unknown.
    pub fn tenant_role(&self) -> TenantRole {
        self.role
            .as_deref()
            .and_then(TenantRole::parse)
            .unwrap_or_default()
    }
}

/// Typed view over a gateway authorizer's claim map.
///
/// The hosting gateway verifies the federated identity token upstream and
/// forwards its claims as a flat string map; this type extracts the fields
/// the resolver validates. Both plain claim names and the `custom:`
/// prefixed form some identity pools emit are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FederatedClaims {
    /// Subject (user ID)
    pub sub: Option<String>,

    /// Tenant the subject belongs to
    pub tenant_id: Option<String>,

    /// Role within the tenant
    pub role: Option<String>,

    /// Issuer the gateway verified the token against
    pub issuer: Option<String>,

    /// Audience the token was minted for
    pub audience: Option<String>,

    /// Expiration time (Unix timestamp)
    pub expires_at: Option<i64>,
}

impl FederatedClaims {
    /// Build from an authorizer claim map.
    pub fn from_map(claims: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| claims.get(*key))
                .map(|value| value.to_string())
        };

        Self {
            sub: get(&["sub"]),
            tenant_id: get(&["tenant_id", "custom:tenant_id"]),
            role: get(&["role", "custom:role"]),
            issuer: get(&["iss"]),
            audience: get(&["aud"]),
            expires_at: get(&["exp"]).and_then(|value| value.parse().ok()),
        }
    }

    /// Check if the claims are past their expiry at `now`.
    ///
    /// Claims without an `exp` are treated as expired; the gateway always
    /// forwards one for a token it actually verified.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(exp) => exp <= now.timestamp(),
            None => true,
        }
    }

    /// The subject's role, mapped to the least-privileged role when the
    /// claim is missing or unknown.
    pub fn tenant_role(&self) -> TenantRole {
        self.role
            .as_deref()
            .and_then(TenantRole::parse)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let claims = TenantClaims::new(
            "user-1",
            "tn_acme",
            TenantRole::Member,
            Duration::hours(1),
            "ledgerline-platform",
            vec!["console".to_string()],
        );

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.tenant_id.as_deref(), Some("tn_acme"));
        assert_eq!(claims.tenant_role(), TenantRole::Member);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_expiration() {
        let mut claims = TenantClaims::new(
            "user-1",
            "tn_acme",
            TenantRole::Member,
            Duration::hours(1),
            "ledgerline-platform",
            vec!["console".to_string()],
        );
        claims.exp = Utc::now().timestamp() - 3600; // 1 hour ago

        assert!(claims.is_expired());
    }

    #[test]
    fn test_unknown_role_maps_to_least_privilege() {
        let mut claims = TenantClaims::new(
            "user-1",
            "tn_acme",
            TenantRole::Member,
            Duration::hours(1),
            "ledgerline-platform",
            vec!["console".to_string()],
        );
        claims.role = Some("superuser".to_string());
        assert_eq!(claims.tenant_role(), TenantRole::ReadOnly);

        claims.role = None;
        assert_eq!(claims.tenant_role(), TenantRole::ReadOnly);
    }

    #[test]
    fn test_federated_from_map() {
        let mut map = HashMap::new();
        map.insert("sub".to_string(), "user-2".to_string());
        map.insert("custom:tenant_id".to_string(), "tn_acme".to_string());
        map.insert("custom:role".to_string(), "admin".to_string());
        map.insert("iss".to_string(), "https://idp.example.com".to_string());
        map.insert("aud".to_string(), "ledgerline".to_string());
        map.insert(
            "exp".to_string(),
            (Utc::now().timestamp() + 600).to_string(),
        );

        let claims = FederatedClaims::from_map(&map);
        assert_eq!(claims.sub.as_deref(), Some("user-2"));
        assert_eq!(claims.tenant_id.as_deref(), Some("tn_acme"));
        assert_eq!(claims.tenant_role(), TenantRole::Admin);
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn test_federated_plain_names_take_priority() {
        let mut map = HashMap::new();
        map.insert("tenant_id".to_string(), "tn_plain".to_string());
        map.insert("custom:tenant_id".to_string(), "tn_custom".to_string());

        let claims = FederatedClaims::from_map(&map);
        assert_eq!(claims.tenant_id.as_deref(), Some("tn_plain"));
    }

    #[test]
    fn test_federated_missing_exp_is_expired() {
        let claims = FederatedClaims::from_map(&HashMap::new());
        assert!(claims.is_expired(Utc::now()));
    }
}
