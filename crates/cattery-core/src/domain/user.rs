use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// User entity - represents a registered account.
///
/// Not `Serialize`: it carries the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A user row to insert. The hash is already computed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// The public face of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Raw signup input. `name` is accepted as an alias of `username`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationDraft {
    #[serde(alias = "name")]
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated signup input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl RegistrationDraft {
    pub fn validate(self) -> Result<Registration, DomainError> {
        let username = trimmed(self.username);
        let password = self.password.filter(|p| !p.is_empty());

        let (Some(username), Some(password)) = (username, password) else {
            return Err(DomainError::validation("Username and password are required"));
        };

        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let email = trimmed(self.email).map(|e| e.to_lowercase());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(DomainError::validation("Invalid email address"));
            }
        }

        Ok(Registration {
            username,
            email,
            password,
        })
    }
}

/// Raw login input. Lookup is by email when present, otherwise by username.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginDraft {
    #[serde(alias = "name")]
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// How a login attempt identifies its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginKey {
    Email(String),
    Username(String),
}

impl LoginDraft {
    pub fn validate(self) -> Result<(LoginKey, String), DomainError> {
        let key = match (trimmed(self.email), trimmed(self.username)) {
            (Some(email), _) => Some(LoginKey::Email(email.to_lowercase())),
            (None, Some(username)) => Some(LoginKey::Username(username)),
            (None, None) => None,
        };
        let password = self.password.filter(|p| !p.is_empty());

        match (key, password) {
            (Some(key), Some(password)) => Ok((key, password)),
            _ => Err(DomainError::validation(
                "Email or username and password are required",
            )),
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(username: &str, email: Option<&str>, password: &str) -> RegistrationDraft {
        RegistrationDraft {
            username: Some(username.into()),
            email: email.map(Into::into),
            password: Some(password.into()),
        }
    }

    #[test]
    fn registration_requires_username_and_password() {
        assert!(RegistrationDraft::default().validate().is_err());
        assert!(draft("", None, "longenough").validate().is_err());
        assert!(draft("kit", None, "").validate().is_err());
    }

    #[test]
    fn registration_enforces_password_length() {
        let err = draft("kit", None, "short").validate().unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }

    #[test]
    fn registration_normalizes_email() {
        let reg = draft("kit", Some(" Kit@Example.COM "), "longenough")
            .validate()
            .unwrap();
        assert_eq!(reg.email.as_deref(), Some("kit@example.com"));
        assert!(draft("kit", Some("nope"), "longenough").validate().is_err());
    }

    #[test]
    fn name_is_an_alias_for_username() {
        let draft: RegistrationDraft =
            serde_json::from_str(r#"{"name":"kit","password":"longenough"}"#).unwrap();
        assert_eq!(draft.validate().unwrap().username, "kit");
    }

    #[test]
    fn login_prefers_email() {
        let (key, _) = LoginDraft {
            username: Some("kit".into()),
            email: Some("Kit@example.com".into()),
            password: Some("pw".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(key, LoginKey::Email("kit@example.com".into()));
    }

    #[test]
    fn login_needs_a_key_and_password() {
        assert!(LoginDraft::default().validate().is_err());
        let no_password = LoginDraft {
            username: Some("kit".into()),
            ..Default::default()
        };
        assert!(no_password.validate().is_err());
    }
}
