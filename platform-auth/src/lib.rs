//! # Platform Authentication
//!
//! This crate resolves a request's auth context for the Ledgerline
//! platform, shared across the console, capture, and books handlers.
//!
//! ## Overview
//!
//! The platform-auth crate handles:
//! - **Bearer JWTs**: Verification and minting of platform-issued tokens
//! - **Federated claims**: Validation of gateway-forwarded identity claims
//! - **Environment detection**: Multi-signal production detection
//! - **Fail-closed resolution**: Unauthenticated requests are rejected in
//!   production and receive a fixed development identity elsewhere
//!
//! ## Resolution Order
//!
//! ```text
//! RequestCredentials
//!   ├─ bearer token present   → verify signature, extract tenant claims
//!   ├─ federated claims present → validate issuer/audience/expiry
//!   └─ neither                → production? reject + critical event
//!                               otherwise → fixed development identity
//! ```
//!
//! A credential that is present but invalid is terminal: it never falls
//! through to the next scheme or to the development identity.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use platform_audit::TracingSink;
//! use platform_auth::{
//!     AuthContextResolver, EnvironmentSignals, FederatedConfig, JwtService,
//!     RequestCredentials,
//! };
//!
//! // In a real binary the signals come from EnvironmentSignals::from_env(),
//! // captured once at startup.
//! let resolver = AuthContextResolver::new(
//!     EnvironmentSignals::default(),
//!     Arc::new(TracingSink::new()),
//! )
//! .with_jwt(JwtService::with_secret("a-secret-key-of-at-least-32-characters").unwrap())
//! .with_federated(FederatedConfig::new("https://idp.example.com", "ledgerline"));
//!
//! // An unauthenticated request outside production resolves to the
//! // development identity.
//! let ctx = resolver.resolve(&RequestCredentials::empty()).unwrap();
//! assert!(ctx.is_dev_fallback());
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate integrates with:
//! - `platform-tenant`: Tenant roles carried in claims and contexts
//! - `platform-audit`: Bypass-attempt and dev-fallback events

pub mod claims;
pub mod context;
pub mod env;
pub mod error;
pub mod jwt;
pub mod resolver;

// Re-export main types
pub use claims::{FederatedClaims, TenantClaims};
pub use context::{AuthContext, AuthMethod};
pub use env::EnvironmentSignals;
pub use error::{AuthError, AuthResult};
pub use jwt::{JwtAlgorithm, JwtConfig, JwtService};
pub use resolver::{
    AuthContextResolver, FederatedConfig, RequestCredentials, DEV_TENANT_ID, DEV_USER_ID,
};
