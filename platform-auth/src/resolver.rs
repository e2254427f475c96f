//! Auth context resolution
//!
//! This module derives the per-request [`AuthContext`] from whichever
//! credential scheme the request carries, failing closed when nothing
//! verifiable is present in a production runtime.
//!
//! Scheme selection is a pure function of the credential material and the
//! environment signals captured at construction time: bearer tokens first,
//! then federated claims, then the unauthenticated branch. A credential
//! that is present but fails verification is terminal: it never falls
//! through to the other scheme or to the development identity.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use platform_audit::{SecurityEvent, SecurityEventSink, SecurityEventType, Severity};
use platform_tenant::TenantRole;

use crate::claims::FederatedClaims;
use crate::context::{AuthContext, AuthMethod};
use crate::env::EnvironmentSignals;
use crate::error::{AuthError, AuthResult};
use crate::jwt::JwtService;

/// Tenant id of the fixed development-only identity.
pub const DEV_TENANT_ID: &str = "local-dev-tenant";

/// User id of the fixed development-only identity.
pub const DEV_USER_ID: &str = "local-dev-user";

/// Expected issuer/audience for gateway-forwarded federated claims.
#[derive(Debug, Clone)]
pub struct FederatedConfig {
    /// Issuer the gateway verified the token against
    pub issuer: String,

    /// Audience the token must have been minted for
    pub audience: String,
}

impl FederatedConfig {
    /// Create a new federated-scheme configuration.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }
}

/// The request-scoped credential bag the HTTP layer hands in.
///
/// Carries either bearer material, a federated authorizer claim map,
/// both, or neither.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Raw bearer token, without the `Bearer ` prefix
    pub bearer_token: Option<String>,

    /// Claim map forwarded by the gateway authorizer
    pub federated_claims: Option<HashMap<String, String>>,
}

impl RequestCredentials {
    /// A request with no credential material.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A request carrying a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
            federated_claims: None,
        }
    }

    /// A request carrying gateway-forwarded federated claims.
    pub fn federated(claims: HashMap<String, String>) -> Self {
        Self {
            bearer_token: None,
            federated_claims: Some(claims),
        }
    }

    /// Add a bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Add federated claims.
    pub fn with_federated(mut self, claims: HashMap<String, String>) -> Self {
        self.federated_claims = Some(claims);
        self
    }
}

/// Resolves request credentials into an [`AuthContext`].
///
/// All configuration (the scheme verifiers, the environment signals, the
/// event sink) is injected at construction; request handling reads no
/// ambient global state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use platform_audit::TracingSink;
/// use platform_auth::{
///     AuthContextResolver, EnvironmentSignals, JwtService, RequestCredentials,
/// };
/// use platform_tenant::TenantRole;
///
/// let jwt = JwtService::with_secret("a-secret-key-of-at-least-32-characters").unwrap();
/// let token = jwt.issue_token("user-1", "tn_acme", TenantRole::Member).unwrap();
///
/// let resolver = AuthContextResolver::new(EnvironmentSignals::default(), Arc::new(TracingSink))
///     .with_jwt(JwtService::with_secret("a-secret-key-of-at-least-32-characters").unwrap());
///
/// let ctx = resolver.resolve(&RequestCredentials::bearer(token)).unwrap();
/// assert_eq!(ctx.tenant_id, "tn_acme");
/// ```
pub struct AuthContextResolver {
    jwt: Option<JwtService>,
    federated: Option<FederatedConfig>,
    signals: EnvironmentSignals,
    sink: Arc<dyn SecurityEventSink>,
}

impl std::fmt::Debug for AuthContextResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContextResolver")
            .field("bearer_configured", &self.jwt.is_some())
            .field("federated_configured", &self.federated.is_some())
            .field("signals", &self.signals)
            .finish()
    }
}

impl AuthContextResolver {
    /// Create a resolver with no credential schemes configured.
    ///
    /// # Arguments
    ///
    /// * `signals` - Environment signals captured at startup
    /// * `sink` - Destination for security events
    pub fn new(signals: EnvironmentSignals, sink: Arc<dyn SecurityEventSink>) -> Self {
        Self {
            jwt: None,
            federated: None,
            signals,
            sink,
        }
    }

    /// Enable the bearer-token scheme.
    pub fn with_jwt(mut self, service: JwtService) -> Self {
        self.jwt = Some(service);
        self
    }

    /// Enable the federated-claims scheme.
    pub fn with_federated(mut self, config: FederatedConfig) -> Self {
        self.federated = Some(config);
        self
    }

    /// Resolve request credentials into an auth context.
    ///
    /// Bearer material takes priority when both schemes are configured
    /// and both credentials are present. Every failure is terminal for
    /// the request; callers surface it as a 401-equivalent and never
    /// retry.
    pub fn resolve(&self, credentials: &RequestCredentials) -> AuthResult<AuthContext> {
        if let Some(token) = credentials.bearer_token.as_deref() {
            return self.resolve_bearer(token);
        }

        if let Some(claims) = credentials.federated_claims.as_ref() {
            return self.resolve_federated(claims);
        }

        self.resolve_unauthenticated()
    }

    fn resolve_bearer(&self, token: &str) -> AuthResult<AuthContext> {
        let service = self
            .jwt
            .as_ref()
            .ok_or_else(|| AuthError::InvalidToken("bearer scheme not configured".to_string()))?;

        // Signature and registered-claim validation happen before any
        // claim is extracted.
        let claims = service.validate_token(token)?;

        let tenant_id = claims
            .tenant_id
            .clone()
            .ok_or_else(|| AuthError::MissingClaim("tenant_id".to_string()))?;

        Ok(AuthContext::new(
            tenant_id,
            claims.sub.clone(),
            claims.tenant_role(),
            AuthMethod::Bearer,
        ))
    }

    fn resolve_federated(&self, claim_map: &HashMap<String, String>) -> AuthResult<AuthContext> {
        let config = self.federated.as_ref().ok_or_else(|| {
            AuthError::InvalidFederatedClaims("federated scheme not configured".to_string())
        })?;

        let claims = FederatedClaims::from_map(claim_map);

        if claims.issuer.as_deref() != Some(config.issuer.as_str()) {
            return Err(AuthError::InvalidFederatedClaims(
                "issuer mismatch".to_string(),
            ));
        }
        if claims.audience.as_deref() != Some(config.audience.as_str()) {
            return Err(AuthError::InvalidFederatedClaims(
                "audience mismatch".to_string(),
            ));
        }
        if claims.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        let user_id = claims
            .sub
            .clone()
            .ok_or_else(|| AuthError::MissingClaim("sub".to_string()))?;
        let tenant_id = claims
            .tenant_id
            .clone()
            .ok_or_else(|| AuthError::MissingClaim("tenant_id".to_string()))?;

        Ok(AuthContext::new(
            tenant_id,
            user_id,
            claims.tenant_role(),
            AuthMethod::Federated,
        ))
    }

    fn resolve_unauthenticated(&self) -> AuthResult<AuthContext> {
        if self.signals.is_production() {
            self.sink.emit(
                SecurityEvent::new(
                    SecurityEventType::AuthBypassAttempt,
                    Severity::Critical,
                    "request reached a protected handler with no verifiable credentials",
                    self.signals.label(),
                )
                .with_context("bearer_scheme_configured", serde_json::json!(self.jwt.is_some()))
                .with_context(
                    "federated_scheme_configured",
                    serde_json::json!(self.federated.is_some()),
                )
                .with_context("signals", self.signals.describe()),
            );
            return Err(AuthError::AuthenticationRequired);
        }

        tracing::warn!(
            tenant_id = DEV_TENANT_ID,
            user_id = DEV_USER_ID,
            "no credentials presented; issuing the development identity"
        );
        self.sink.emit(SecurityEvent::new(
            SecurityEventType::DevFallbackUsed,
            Severity::Warning,
            "development identity issued to an unauthenticated request",
            self.signals.label(),
        ));

        Ok(AuthContext::new(
            DEV_TENANT_ID,
            DEV_USER_ID,
            TenantRole::Owner,
            AuthMethod::DevFallback,
        ))
    }
}
