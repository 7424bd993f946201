//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use cattery_infra::JwtConfig;
use cattery_infra::database::DatabaseConfig;

#[cfg(feature = "scheduler")]
use crate::background::SchedulerConfig;

const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// How clients prove who they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Opaque id in the `session_id` cookie, stored server-side.
    Session,
    /// Signed bearer token.
    Jwt,
}

impl FromStr for AuthStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "session" | "cookie" => Ok(AuthStrategy::Session),
            "jwt" | "token" | "bearer" => Ok(AuthStrategy::Jwt),
            other => Err(format!("unknown auth strategy '{}'", other)),
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub strategy: AuthStrategy,
    pub session_ttl: chrono::Duration,
    /// Mark the session cookie `Secure`. Turn off only for plain-http development.
    pub cookie_secure: bool,
    pub jwt: JwtConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            strategy: AuthStrategy::Session,
            session_ttl: chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS),
            cookie_secure: true,
            jwt: JwtConfig::default(),
        }
    }
}

/// Cat resource settings.
#[derive(Debug, Clone, Default)]
pub struct CatsConfig {
    pub require_tag: bool,
    pub write_requires_auth: bool,
}

/// Cross-origin settings.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Origins allowed to make credentialed requests. Empty reflects any origin.
    pub allowed_origins: Vec<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub run_migrations: bool,
    pub auth: AuthConfig,
    pub cats: CatsConfig,
    pub cors: CorsConfig,
    /// Attach the underlying cause to 500 responses.
    pub expose_error_details: bool,
    #[cfg(feature = "scheduler")]
    pub scheduler: SchedulerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            run_migrations: true,
            auth: AuthConfig::default(),
            cats: CatsConfig::default(),
            cors: CorsConfig::default(),
            expose_error_details: true,
            #[cfg(feature = "scheduler")]
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                let mut config = DatabaseConfig::new(url);
                config.max_connections = env_parse("DB_MAX_CONNECTIONS", config.max_connections);
                config.min_connections = env_parse("DB_MIN_CONNECTIONS", config.min_connections);
                config
            });

        let strategy = match env::var("AUTH_STRATEGY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; falling back to session auth", e);
                AuthStrategy::Session
            }),
            Err(_) => defaults.auth.strategy,
        };

        let auth = AuthConfig {
            strategy,
            session_ttl: session_ttl(env_parse("SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)),
            cookie_secure: env_flag("COOKIE_SECURE", defaults.auth.cookie_secure),
            jwt: JwtConfig::from_env(),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port),
            database,
            run_migrations: env_flag("DB_RUN_MIGRATIONS", defaults.run_migrations),
            auth,
            cats: CatsConfig {
                require_tag: env_flag("CATS_REQUIRE_TAG", false),
                write_requires_auth: env_flag("CATS_WRITE_REQUIRES_AUTH", false),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|raw| parse_origins(&raw))
                    .unwrap_or_default(),
            },
            expose_error_details: env_flag("EXPOSE_ERROR_DETAILS", defaults.expose_error_details),
            #[cfg(feature = "scheduler")]
            scheduler: SchedulerConfig::from_env(),
        }
    }
}

/// Session lifetime from a day count; values outside `1..=3650` fall back to 7 days.
fn session_ttl(days: i64) -> chrono::Duration {
    if (1..=MAX_SESSION_TTL_DAYS).contains(&days) {
        chrono::Duration::days(days)
    } else {
        tracing::warn!(
            days,
            "SESSION_TTL_DAYS out of range; using {} days",
            DEFAULT_SESSION_TTL_DAYS
        );
        chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS)
    }
}

/// Comma-separated origins, without trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a boolean flag. `false`, `0`, `no` and `off` are false; anything else is true.
pub(crate) fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
