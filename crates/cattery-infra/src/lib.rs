//! # Cattery Infrastructure
//!
//! Concrete implementations of the ports defined in `cattery-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No database driver, in-memory repositories only
//! - `postgres` - PostgreSQL repositories via SeaORM

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService, SessionAuthenticator};
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::DatabasePool;
