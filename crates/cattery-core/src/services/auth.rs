use std::sync::Arc;

use crate::domain::{LoginDraft, LoginKey, NewUser, RegistrationDraft, User, UserIdentity};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthError, Authenticator, Credential, CredentialKind, PasswordService, UserRepository,
};

const USER_EXISTS: &str = "User already exists";

/// Registration, login and credential checks.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    authenticator: Arc<dyn Authenticator>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            users,
            passwords,
            authenticator,
        }
    }

    pub fn credential_kind(&self) -> CredentialKind {
        self.authenticator.kind()
    }

    /// Create an account. Duplicate usernames or emails are a conflict.
    pub async fn register(&self, draft: RegistrationDraft) -> Result<User, DomainError> {
        let registration = draft.validate()?;

        if self
            .users
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(DomainError::Duplicate(USER_EXISTS.to_string()));
        }
        if let Some(email) = &registration.email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(DomainError::Duplicate(USER_EXISTS.to_string()));
            }
        }

        let password_hash = self.passwords.hash(&registration.password)?;

        let user = self
            .users
            .insert(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => DomainError::Duplicate(USER_EXISTS.to_string()),
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verify a password and issue a credential.
    ///
    /// Unknown users and wrong passwords fail with the same error.
    pub async fn login(&self, draft: LoginDraft) -> Result<(User, Credential), DomainError> {
        let (key, password) = draft.validate()?;

        let user = match &key {
            LoginKey::Email(email) => self.users.find_by_email(email).await?,
            LoginKey::Username(username) => self.users.find_by_username(username).await?,
        };

        let Some(user) = user else {
            tracing::debug!("Login rejected: no such user");
            return Err(DomainError::Unauthorized);
        };

        if !self.passwords.verify(&password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected: password mismatch");
            return Err(DomainError::Unauthorized);
        }

        let credential = self.authenticator.issue(&user).await?;
        tracing::info!(user_id = user.id, kind = ?credential.kind, "User logged in");
        Ok((user, credential))
    }

    pub async fn authenticate(&self, credential: &str) -> Result<UserIdentity, AuthError> {
        self.authenticator.authenticate(credential).await
    }

    /// Revoke a credential if one was presented.
    pub async fn logout(&self, credential: Option<&str>) -> Result<(), DomainError> {
        if let Some(credential) = credential {
            self.authenticator.revoke(credential).await?;
        }
        Ok(())
    }
}
