//! Application state - shared across all handlers.

use std::sync::Arc;

use cattery_core::ports::{
    AdoptionRepository, Authenticator, CatRepository, PasswordService, SessionRepository,
    UserRepository,
};
use cattery_core::services::{AdoptionService, AuthService, CatService};
use cattery_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService, SessionAuthenticator};

#[cfg(feature = "postgres")]
use cattery_infra::database::{
    DatabaseConfig, DatabasePool, PostgresAdoptionRepository, PostgresCatRepository,
    PostgresSessionRepository, PostgresUserRepository,
};

use crate::config::{AppConfig, AuthStrategy};

/// Which storage backend the repositories talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    InMemory,
}

/// One implementation of every repository port.
#[derive(Clone)]
pub struct Repositories {
    pub backend: StorageBackend,
    pub cats: Arc<dyn CatRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub adoptions: Arc<dyn AdoptionRepository>,
}

impl Repositories {
    /// Process-local repositories. Data is lost on restart.
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            backend: StorageBackend::InMemory,
            cats: Arc::new(store.cats()),
            users: Arc::new(store.users()),
            sessions: Arc::new(store.sessions()),
            adoptions: Arc::new(store.adoptions()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: &DatabasePool) -> Self {
        Self {
            backend: StorageBackend::Postgres,
            cats: Arc::new(PostgresCatRepository::new(pool.conn.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.conn.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool.conn.clone())),
            adoptions: Arc::new(PostgresAdoptionRepository::new(pool.conn.clone())),
        }
    }

    /// Connect to PostgreSQL, falling back to memory when that fails.
    pub async fn connect(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match Self::connect_postgres(db_config, config.run_migrations).await {
                    Ok(repos) => return repos,
                    Err(e) => {
                        tracing::error!(
                            "Failed to initialize database: {}. Using in-memory fallback.",
                            e
                        );
                        return Self::in_memory();
                    }
                }
            }
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        #[cfg(not(feature = "postgres"))]
        {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            tracing::info!("Running without postgres feature - using in-memory repositories");
        }

        Self::in_memory()
    }

    #[cfg(feature = "postgres")]
    async fn connect_postgres(
        db_config: &DatabaseConfig,
        run_migrations: bool,
    ) -> Result<Self, migration::DbErr> {
        use migration::{Migrator, MigratorTrait};

        let pool = DatabasePool::init(db_config).await?;

        if run_migrations {
            Migrator::up(&pool.conn, None).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self::postgres(&pool))
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cats: Arc<CatService>,
    pub auth: Arc<AuthService>,
    pub adoptions: Arc<AdoptionService>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: AppConfig) -> Self {
        let repos = Repositories::connect(&config).await;
        Self::from_parts(config, repos, Arc::new(Argon2PasswordService::new()))
    }

    /// In-memory state, for tests and database-less runs.
    pub fn in_memory(config: AppConfig, passwords: Arc<dyn PasswordService>) -> Self {
        Self::from_parts(config, Repositories::in_memory(), passwords)
    }

    /// Wire services on top of the given repositories.
    pub fn from_parts(
        config: AppConfig,
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        let authenticator: Arc<dyn Authenticator> = match config.auth.strategy {
            AuthStrategy::Session => Arc::new(SessionAuthenticator::new(
                repos.sessions.clone(),
                config.auth.session_ttl,
            )),
            AuthStrategy::Jwt => Arc::new(JwtTokenService::new(config.auth.jwt.clone())),
        };

        tracing::info!(
            backend = ?repos.backend,
            auth = ?config.auth.strategy,
            "Application state initialized"
        );

        Self {
            cats: Arc::new(CatService::new(repos.cats.clone(), config.cats.require_tag)),
            auth: Arc::new(AuthService::new(repos.users.clone(), passwords, authenticator)),
            adoptions: Arc::new(AdoptionService::new(repos.adoptions.clone(), repos.cats.clone())),
            sessions: repos.sessions,
            config: Arc::new(config),
        }
    }
}
