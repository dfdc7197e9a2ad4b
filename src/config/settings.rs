//! Runtime configuration.
//!
//! Every setting comes from an environment variable with a default that
//! works for local development; `.env` loading happens in the binaries via
//! `dotenvy`. `AppConfig::from_env` assembles and validates the whole tree.

use crate::errors::{InnkeepError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse an env var, falling back to `default` when the variable
/// is absent or unparsable.
fn env_parsed<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok()).unwrap_or(default)
}

/// Read a boolean env var. `true` and `1` count as set; `None` means the
/// variable is absent so the caller picks the default.
fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    Some(matches!(raw.to_lowercase().as_str(), "true" | "1"))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deployment environment, used to derive production-only behavior such as
/// the `Secure` attribute on the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Parse from `INNKEEP_ENV`; anything other than a production-like
    /// value falls back to development.
    pub fn from_env() -> Self {
        match std::env::var("INNKEEP_ENV").ok().as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Root of the configuration tree.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    pub environment: Environment,

    #[validate(nested)]
    pub server: ServerConfig,

    #[validate(nested)]
    pub database: DatabaseConfig,

    #[validate(nested)]
    pub auth: AuthConfig,

    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Assemble the full configuration from the environment and validate it.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_env();
        let config = Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(environment),
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(InnkeepError::from)?;

        // Scheme check sits outside the validator attributes.
        if !self.database.url.starts_with("sqlite:") {
            return Err(InnkeepError::validation("Database URL must use the sqlite scheme"));
        }

        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1, message = "bind host cannot be empty"))]
    pub host: String,

    #[validate(range(min = 1, message = "port cannot be 0"))]
    pub port: u16,

    pub enable_cors: bool,

    /// Origins allowed by CORS; empty means any origin, without credentials.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            cors_origins: vec![],
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn from_env() -> Self {
        Self {
            host: env_string("INNKEEP_HOST", "127.0.0.1"),
            port: env_parsed("INNKEEP_PORT", 8080),
            enable_cors: env_flag("INNKEEP_ENABLE_CORS").unwrap_or(true),
            cors_origins: split_csv(&env_string("INNKEEP_CORS_ORIGINS", "")),
        }
    }
}

/// SQLite pool settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    #[validate(length(min = 1, message = "database URL cannot be empty"))]
    pub url: String,

    #[validate(range(min = 1, max = 100, message = "max_connections must be within 1..=100"))]
    pub max_connections: u32,

    #[validate(range(max = 50, message = "min_connections must be at most 50"))]
    pub min_connections: u32,

    #[validate(range(min = 1, max = 60, message = "connect timeout must be within 1..=60 seconds"))]
    pub connect_timeout_seconds: u64,

    /// 0 disables the idle reaper.
    pub idle_timeout_seconds: u64,

    /// Run pending migrations on startup.
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/innkeep.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.idle_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn from_env() -> Self {
        Self {
            url: env_string("DATABASE_URL", "sqlite://./data/innkeep.db"),
            max_connections: env_parsed("DATABASE_MAX_CONNECTIONS", 10),
            min_connections: env_parsed("DATABASE_MIN_CONNECTIONS", 0),
            connect_timeout_seconds: env_parsed("DATABASE_CONNECT_TIMEOUT_SECONDS", 10),
            idle_timeout_seconds: env_parsed("DATABASE_IDLE_TIMEOUT_SECONDS", 600),
            auto_migrate: env_flag("DATABASE_AUTO_MIGRATE").unwrap_or(true),
        }
    }
}

/// Session and invitation lifetimes plus cookie attributes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    #[validate(range(min = 1, max = 8760, message = "session TTL must be 1 hour to 1 year"))]
    pub session_ttl_hours: u64,

    #[validate(range(min = 1, max = 8760, message = "invitation TTL must be 1 hour to 1 year"))]
    pub invitation_ttl_hours: u64,

    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24 * 7,
            invitation_ttl_hours: 72,
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours * 3600)
    }

    pub fn invitation_ttl(&self) -> Duration {
        Duration::from_secs(self.invitation_ttl_hours * 3600)
    }

    /// The cookie `Secure` flag follows the deployment environment unless
    /// `INNKEEP_COOKIE_SECURE` overrides it.
    pub fn from_env(environment: Environment) -> Self {
        Self {
            session_ttl_hours: env_parsed("INNKEEP_SESSION_TTL_HOURS", 24 * 7),
            invitation_ttl_hours: env_parsed("INNKEEP_INVITATION_TTL_HOURS", 72),
            cookie_secure: env_flag("INNKEEP_COOKIE_SECURE")
                .unwrap_or_else(|| environment.is_production()),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    #[validate(length(min = 1, message = "service name cannot be empty"))]
    pub service_name: String,

    /// Default tracing filter; `RUST_LOG` wins when set.
    #[validate(length(min = 1, message = "log level cannot be empty"))]
    pub log_level: String,

    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "innkeep".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            service_name: env_string("INNKEEP_SERVICE_NAME", "innkeep"),
            log_level: env_string("INNKEEP_LOG_LEVEL", "info"),
            json_logging: env_flag("INNKEEP_JSON_LOGGING").unwrap_or(false),
        }
    }
}
