//! Server-side session authentication.

use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use async_trait::async_trait;
use chrono::{Duration, Utc};

use cattery_core::domain::{Session, User, UserIdentity};
use cattery_core::ports::{AuthError, Authenticator, Credential, CredentialKind, SessionRepository};

const SESSION_ID_BYTES: usize = 32;

/// Opaque session ids backed by a [`SessionRepository`].
///
/// The id is the only thing the client holds. Expired sessions are removed
/// when they are presented and by the periodic purge.
pub struct SessionAuthenticator {
    sessions: Arc<dyn SessionRepository>,
    ttl: Duration,
}

impl SessionAuthenticator {
    pub fn new(sessions: Arc<dyn SessionRepository>, ttl: Duration) -> Self {
        Self { sessions, ttl }
    }

    fn generate_id() -> String {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    fn kind(&self) -> CredentialKind {
        CredentialKind::SessionCookie
    }

    async fn issue(&self, user: &User) -> Result<Credential, AuthError> {
        let session = Session::new(Self::generate_id(), user.id, self.ttl);
        let credential = Credential {
            kind: CredentialKind::SessionCookie,
            value: session.id.clone(),
            expires_at: session.expires_at,
        };

        self.sessions.insert(session).await?;
        tracing::debug!(user_id = user.id, "Session created");

        Ok(credential)
    }

    async fn authenticate(&self, credential: &str) -> Result<UserIdentity, AuthError> {
        let Some((session, user)) = self.sessions.find_with_user(credential).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if session.is_expired_at(Utc::now()) {
            self.sessions.remove(&session.id).await?;
            tracing::debug!(user_id = user.id, "Expired session removed");
            return Err(AuthError::SessionExpired);
        }

        Ok(UserIdentity::from(&user))
    }

    async fn revoke(&self, credential: &str) -> Result<(), AuthError> {
        self.sessions.remove(credential).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use cattery_core::domain::NewUser;
    use cattery_core::ports::UserRepository;

    async fn setup(ttl: Duration) -> (InMemoryStore, SessionAuthenticator, User) {
        let store = InMemoryStore::new();
        let user = store
            .users()
            .insert(NewUser {
                username: "alice".into(),
                email: Some("alice@example.com".into()),
                password_hash: "$argon2id$test".into(),
            })
            .await
            .unwrap();
        let auth = SessionAuthenticator::new(Arc::new(store.sessions()), ttl);
        (store, auth, user)
    }

    #[test]
    fn session_ids_are_random_hex() {
        let a = SessionAuthenticator::generate_id();
        let b = SessionAuthenticator::generate_id();

        assert_eq!(a.len(), SESSION_ID_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn issued_session_authenticates_until_revoked() {
        let (_store, auth, user) = setup(Duration::days(7)).await;

        let credential = auth.issue(&user).await.unwrap();
        assert_eq!(credential.kind, CredentialKind::SessionCookie);

        let identity = auth.authenticate(&credential.value).await.unwrap();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));

        auth.revoke(&credential.value).await.unwrap();
        assert!(matches!(
            auth.authenticate(&credential.value).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let (_store, auth, _user) = setup(Duration::days(7)).await;

        assert!(matches!(
            auth.authenticate("deadbeef").await,
            Err(AuthError::InvalidCredentials)
        ));
        auth.revoke("deadbeef").await.unwrap();
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_removed() {
        let (store, auth, user) = setup(Duration::seconds(-1)).await;

        let credential = auth.issue(&user).await.unwrap();
        assert!(matches!(
            auth.authenticate(&credential.value).await,
            Err(AuthError::SessionExpired)
        ));
        assert!(store
            .sessions()
            .find_with_user(&credential.value)
            .await
            .unwrap()
            .is_none());
    }
}
