//! JWT token issuance and verification
//! Tokens are stateless: validity is signature plus expiry, nothing else

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Token verification failure.
///
/// Both variants answer 401 at the HTTP boundary; the distinction exists for
/// logging and testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::Unauthorized
    }
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl_secs: u64,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Expiry is enforced exactly, without the default leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            token_ttl_secs: config.security.token_ttl_secs,
        })
    }

    /// Configured token lifetime in seconds
    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_secs
    }

    /// Issue a signed token for the given account
    pub fn issue(&self, account_id: &Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.token_ttl_secs as i64);

        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Verify a token and return the embedded account ID.
    ///
    /// Signature integrity is checked before expiry; a tampered token is
    /// `Invalid` even if it also happens to be expired.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig};
    use secrecy::Secret;

    fn test_config(ttl_secs: u64) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                addr: "127.0.0.1:5000".to_string(),
                graceful_shutdown_timeout_secs: 30,
                allowed_origins: None,
            },
            database: DatabaseConfig {
                url: Secret::new("postgresql://localhost/test".to_string()),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
                token_ttl_secs: ttl_secs,
                password_min_length: 8,
            },
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = JwtService::from_config(&test_config(3600)).unwrap();
        let account_id = Uuid::new_v4();

        let token = service.issue(&account_id).unwrap();
        let verified = service.verify(&token).unwrap();

        assert_eq!(verified, account_id);
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let service = JwtService::from_config(&test_config(3600)).unwrap();
        assert_eq!(service.verify("not-a-token").unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let service = JwtService::from_config(&test_config(3600)).unwrap();
        let token = service.issue(&Uuid::new_v4()).unwrap();

        // Flip part of the signature
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert_eq!(service.verify(&tampered).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let service = JwtService::from_config(&test_config(3600)).unwrap();

        let mut other_config = test_config(3600);
        other_config.security.jwt_secret =
            Secret::new("another_secret_key_32_characters!!".to_string());
        let other = JwtService::from_config(&other_config).unwrap();

        let token = other.issue(&Uuid::new_v4()).unwrap();
        assert_eq!(service.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_expired_token_fails_with_expired() {
        let service = JwtService::from_config(&test_config(3600)).unwrap();

        // Sign claims whose expiry has already passed
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 120,
            exp: now - 60,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key).unwrap();

        assert_eq!(service.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_token_valid_before_expiry() {
        // Short TTL, but still comfortably in the future at verification time
        let service = JwtService::from_config(&test_config(60)).unwrap();
        let account_id = Uuid::new_v4();

        let token = service.issue(&account_id).unwrap();
        assert_eq!(service.verify(&token).unwrap(), account_id);
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = test_config(3600);
        config.security.jwt_secret = Secret::new("short".to_string());
        assert!(JwtService::from_config(&config).is_err());
    }
}
