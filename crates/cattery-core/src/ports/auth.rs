//! Authentication ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{User, UserIdentity};
use crate::error::RepoError;

/// Claims carried by a signed token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: i32,
    pub username: String,
    pub email: Option<String>,
    pub exp: i64,
}

impl From<TokenClaims> for UserIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate a token for a user.
    fn generate_token(&self, identity: &UserIdentity) -> Result<String, AuthError>;

    /// Validate signature and expiry and decode the claims.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Token lifetime in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Where a credential travels between client and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// Opaque id in an http-only cookie, backed by a stored session.
    SessionCookie,
    /// Self-contained signed token in the `Authorization` header.
    BearerToken,
}

/// A freshly issued credential.
#[derive(Debug, Clone)]
pub struct Credential {
    pub kind: CredentialKind,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and checks credentials.
///
/// Storage-backed sessions and stateless tokens are interchangeable
/// implementations of this trait.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn kind(&self) -> CredentialKind;

    /// Issue a credential for a user whose password has been verified.
    async fn issue(&self, user: &User) -> Result<Credential, AuthError>;

    /// Resolve a credential to the user it proves.
    async fn authenticate(&self, credential: &str) -> Result<UserIdentity, AuthError>;

    /// Invalidate a credential. Unknown credentials are ignored.
    async fn revoke(&self, credential: &str) -> Result<(), AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing credentials")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl From<RepoError> for AuthError {
    fn from(err: RepoError) -> Self {
        AuthError::Storage(err.to_string())
    }
}
