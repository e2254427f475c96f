//! JWT token verification and minting
//!
//! This module provides bearer-token operations using the jsonwebtoken
//! crate. Verification always precedes claim extraction: no caller ever
//! sees claims from a token whose signature did not check out.

use crate::claims::TenantClaims;
use crate::error::{AuthError, AuthResult};
use chrono::Duration;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use platform_tenant::TenantRole;
use serde::{Deserialize, Serialize};

/// JWT configuration for token verification and minting.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC algorithms
    pub secret: Option<String>,

    /// Private key (PEM) for RSA signing
    pub private_key: Option<String>,

    /// Public key (PEM) for RSA verification
    pub public_key: Option<String>,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: Vec<String>,

    /// Access token duration
    pub token_duration: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            private_key: None,
            public_key: None,
            algorithm: JwtAlgorithm::HS256,
            issuer: "ledgerline-platform".to_string(),
            audience: vec![
                "console".to_string(),
                "capture".to_string(),
                "books".to_string(),
            ],
            token_duration: Duration::hours(1),
        }
    }
}

/// Supported JWT algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::RS256 => Algorithm::RS256,
        }
    }
}

/// JWT service for token operations.
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - JWT configuration
    ///
    /// # Returns
    ///
    /// JWT service or configuration error
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let encoding_key = Self::create_encoding_key(&config)?;
        let decoding_key = Self::create_decoding_key(&config)?;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Create with a simple secret (HS256).
    ///
    /// # Arguments
    ///
    /// * `secret` - The secret key for HMAC
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        let config = JwtConfig {
            secret: Some(secret.into()),
            algorithm: JwtAlgorithm::HS256,
            ..Default::default()
        };
        Self::new(config)
    }

    fn create_encoding_key(config: &JwtConfig) -> AuthResult<EncodingKey> {
        match config.algorithm {
            JwtAlgorithm::HS256 => {
                let secret = config
                    .secret
                    .as_ref()
                    .ok_or_else(|| AuthError::ConfigError("Secret required for HMAC".to_string()))?;
                Ok(EncodingKey::from_secret(secret.as_bytes()))
            }
            JwtAlgorithm::RS256 => {
                let key = config.private_key.as_ref().ok_or_else(|| {
                    AuthError::ConfigError("Private key required for RSA".to_string())
                })?;
                EncodingKey::from_rsa_pem(key.as_bytes())
                    .map_err(|e| AuthError::ConfigError(format!("Invalid RSA private key: {}", e)))
            }
        }
    }

    fn create_decoding_key(config: &JwtConfig) -> AuthResult<DecodingKey> {
        match config.algorithm {
            JwtAlgorithm::HS256 => {
                let secret = config
                    .secret
                    .as_ref()
                    .ok_or_else(|| AuthError::ConfigError("Secret required for HMAC".to_string()))?;
                Ok(DecodingKey::from_secret(secret.as_bytes()))
            }
            JwtAlgorithm::RS256 => {
                let key = config.public_key.as_ref().ok_or_else(|| {
                    AuthError::ConfigError("Public key required for RSA".to_string())
                })?;
                DecodingKey::from_rsa_pem(key.as_bytes())
                    .map_err(|e| AuthError::ConfigError(format!("Invalid RSA public key: {}", e)))
            }
        }
    }

    /// Mint a tenant-scoped access token.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The subject
    /// * `tenant_id` - The tenant the token is scoped to
    /// * `role` - The subject's role within the tenant
    ///
    /// # Returns
    ///
    /// Encoded JWT token string
    pub fn issue_token(
        &self,
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        role: TenantRole,
    ) -> AuthResult<String> {
        let claims = TenantClaims::new(
            user_id,
            tenant_id,
            role,
            self.config.token_duration,
            self.config.issuer.clone(),
            self.config.audience.clone(),
        );
        self.encode_claims(&claims)
    }

    /// Generate a token from existing claims.
    ///
    /// # Arguments
    ///
    /// * `claims` - Tenant claims to encode
    ///
    /// # Returns
    ///
    /// Encoded JWT token string
    pub fn encode_claims(&self, claims: &TenantClaims) -> AuthResult<String> {
        let header = Header::new(self.config.algorithm.into());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode a token.
    ///
    /// # Arguments
    ///
    /// * `token` - The JWT token string
    ///
    /// # Returns
    ///
    /// Decoded claims if valid
    pub fn validate_token(&self, token: &str) -> AuthResult<TenantClaims> {
        let mut validation = Validation::new(self.config.algorithm.into());
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&self.config.audience);

        let token_data: TokenData<TenantClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AuthError::InvalidToken("Invalid audience".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-secret-key-for-jwt-signing-minimum-32-chars".to_string()
    }

    #[test]
    fn test_jwt_service_creation() {
        let service = JwtService::with_secret(test_secret()).unwrap();
        assert_eq!(service.config().algorithm, JwtAlgorithm::HS256);
    }

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::with_secret(test_secret()).unwrap();

        let token = service
            .issue_token("user-1", "tn_acme", TenantRole::Admin)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.tenant_id.as_deref(), Some("tn_acme"));
        assert_eq!(claims.tenant_role(), TenantRole::Admin);
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::with_secret(test_secret()).unwrap();
        let result = service.validate_token("invalid-token");

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = JwtService::with_secret(test_secret()).unwrap();
        let other = JwtService::with_secret("another-secret-key-at-least-32-chars!").unwrap();

        let token = service
            .issue_token("user-1", "tn_acme", TenantRole::Member)
            .unwrap();

        assert!(matches!(
            other.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::with_secret(test_secret()).unwrap();

        let mut claims = TenantClaims::new(
            "user-1",
            "tn_acme",
            TenantRole::Member,
            Duration::hours(1),
            service.config().issuer.clone(),
            service.config().audience.clone(),
        );
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();

        let token = service.encode_claims(&claims).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_hmac_requires_secret() {
        let config = JwtConfig::default();
        assert!(matches!(
            JwtService::new(config),
            Err(AuthError::ConfigError(_))
        ));
    }
}
