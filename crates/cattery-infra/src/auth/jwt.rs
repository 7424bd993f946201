//! JWT token service implementation.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use cattery_core::domain::{User, UserIdentity};
use cattery_core::ports::{
    AuthError, Authenticator, Credential, CredentialKind, TokenClaims, TokenService,
};

const DEFAULT_SECRET: &str = "change-me-in-production";
const DEFAULT_EXPIRATION_HOURS: i64 = 24 * 7;
/// Longest token lifetime accepted from configuration (about a century).
const MAX_EXPIRATION_HOURS: i64 = 24 * 365 * 100;

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: DEFAULT_EXPIRATION_HOURS,
            issuer: "cattery-api".to_string(),
        }
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("JWT_SECRET").unwrap_or(defaults.secret);

        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self {
            secret,
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

/// Wire format of the token payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: i64,
    iat: i64,
    iss: String,
}

/// Stateless, signed-token authentication.
///
/// Tokens cannot be revoked before they expire: logout only drops the
/// client's copy.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: TimeDelta,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let hours = config.expiration_hours;
        let lifetime = if (-MAX_EXPIRATION_HOURS..=MAX_EXPIRATION_HOURS).contains(&hours) {
            TimeDelta::hours(hours)
        } else {
            tracing::warn!(
                expiration_hours = hours,
                "JWT expiration out of range; using {} hours",
                DEFAULT_EXPIRATION_HOURS
            );
            TimeDelta::hours(DEFAULT_EXPIRATION_HOURS)
        };

        Self {
            encoding_key,
            decoding_key,
            lifetime,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, identity: &UserIdentity) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.lifetime;

        let claims = Claims {
            sub: identity.id.to_string(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id = token_data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            username: token_data.claims.username,
            email: token_data.claims.email,
            exp: token_data.claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}

#[async_trait]
impl Authenticator for JwtTokenService {
    fn kind(&self) -> CredentialKind {
        CredentialKind::BearerToken
    }

    async fn issue(&self, user: &User) -> Result<Credential, AuthError> {
        let value = self.generate_token(&UserIdentity::from(user))?;

        Ok(Credential {
            kind: CredentialKind::BearerToken,
            value,
            expires_at: Utc::now() + self.lifetime,
        })
    }

    async fn authenticate(&self, credential: &str) -> Result<UserIdentity, AuthError> {
        self.validate_token(credential).map(Into::into)
    }

    async fn revoke(&self, _credential: &str) -> Result<(), AuthError> {
        tracing::debug!("Bearer tokens are stateless; nothing to revoke");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    fn identity() -> UserIdentity {
        UserIdentity {
            id: 42,
            username: "whiskers".to_string(),
            email: Some("whiskers@example.com".to_string()),
        }
    }

    #[test]
    fn test_generate_token_success() {
        let service = JwtTokenService::new(test_config());

        let token = service.generate_token(&identity()).unwrap();

        assert!(!token.is_empty());
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_validate_token_success() {
        let service = JwtTokenService::new(test_config());

        let token = service.generate_token(&identity()).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "whiskers");
        assert_eq!(claims.email.as_deref(), Some("whiskers@example.com"));
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtTokenService::new(test_config());

        let result = service.validate_token("invalid-token");

        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_validate_expired_token() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: -2,
            ..test_config()
        });

        let token = service.generate_token(&identity()).unwrap();

        assert!(matches!(
            service.validate_token(&token).unwrap_err(),
            AuthError::TokenExpired
        ));
    }

    #[test]
    fn test_validate_wrong_secret_token() {
        let signer = JwtTokenService::new(test_config());
        let verifier = JwtTokenService::new(JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        });

        let token = signer.generate_token(&identity()).unwrap();

        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let service2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = service1.generate_token(&identity()).unwrap();

        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_expiration_seconds() {
        let service = JwtTokenService::new(JwtConfig::default());

        assert_eq!(service.expiration_seconds(), 7 * 24 * 3600);
    }

    #[test]
    fn out_of_range_expiration_falls_back_to_default() {
        for hours in [i64::MAX, i64::MIN, MAX_EXPIRATION_HOURS + 1] {
            let service = JwtTokenService::new(JwtConfig {
                expiration_hours: hours,
                ..test_config()
            });

            assert_eq!(service.expiration_seconds(), DEFAULT_EXPIRATION_HOURS * 3600);
            let token = service.generate_token(&identity()).unwrap();
            assert!(service.validate_token(&token).is_ok());
        }
    }

    #[tokio::test]
    async fn test_authenticator_round_trip() {
        let service = JwtTokenService::new(test_config());
        let user = User {
            id: 7,
            username: "tofu".to_string(),
            email: None,
            password_hash: "$argon2id$unused".to_string(),
            created_at: Utc::now(),
        };

        let credential = service.issue(&user).await.unwrap();
        assert_eq!(credential.kind, CredentialKind::BearerToken);
        assert!(credential.expires_at > Utc::now());

        let identity = service.authenticate(&credential.value).await.unwrap();
        assert_eq!(identity.id, 7);
        assert_eq!(identity.email, None);

        // Revocation is a no-op: the token keeps working until it expires.
        service.revoke(&credential.value).await.unwrap();
        assert!(service.authenticate(&credential.value).await.is_ok());
    }
}
