//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;

pub use auth::{
    AuthError, Authenticator, Credential, CredentialKind, PasswordService, TokenClaims,
    TokenService,
};
pub use repository::{
    AdoptionRepository, BaseRepository, CatRepository, SessionRepository, UserRepository,
};
