use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AdoptedCat, Adoption, Cat, CatPatch, NewCat, NewUser, Session, User};
use crate::error::RepoError;

/// Generic repository trait shared by the id-addressed tables.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID.
    ///
    /// Returns [`RepoError::NotFound`] when no row was removed.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Cat repository.
#[async_trait]
pub trait CatRepository: BaseRepository<Cat, i32> {
    /// All cats in insertion order.
    async fn list(&self) -> Result<Vec<Cat>, RepoError>;

    /// One window of cats in insertion order.
    async fn list_page(&self, limit: u64, offset: u64) -> Result<Vec<Cat>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn insert(&self, cat: NewCat) -> Result<Cat, RepoError>;

    /// Apply a partial update. [`RepoError::NotFound`] when no row matched.
    async fn update(&self, id: i32, patch: &CatPatch) -> Result<(), RepoError>;
}

/// User repository with lookup by the unique columns.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Insert a user. [`RepoError::Constraint`] on a duplicate username or email.
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Server-side session storage.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: Session) -> Result<(), RepoError>;

    /// Load a session together with its owner.
    async fn find_with_user(&self, id: &str) -> Result<Option<(Session, User)>, RepoError>;

    /// Remove a session. Missing ids are not an error.
    async fn remove(&self, id: &str) -> Result<(), RepoError>;

    /// Remove every session that expired at or before `now`. Returns the count.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError>;
}

/// Adoption repository. Every operation is scoped to one user.
#[async_trait]
pub trait AdoptionRepository: Send + Sync {
    /// The user's adoptions joined with their cats, newest first.
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<AdoptedCat>, RepoError>;

    async fn exists(&self, user_id: i32, cat_id: i32) -> Result<bool, RepoError>;

    /// [`RepoError::Constraint`] when the pair already exists.
    async fn insert(&self, user_id: i32, cat_id: i32) -> Result<Adoption, RepoError>;

    /// [`RepoError::NotFound`] when the user has not adopted the cat.
    async fn remove(&self, user_id: i32, cat_id: i32) -> Result<(), RepoError>;
}
