// Application configuration loaded from the environment at startup

use crate::auth::password::PasswordConfig;
use std::str::FromStr;
use thiserror::Error;

/// Default token lifetime: one day
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Longest accepted token lifetime: ten years
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Which credential store backs the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

/// Deployment environment; production hides internal error details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

/// Process-wide configuration, read once and shared read-only afterwards
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_lifetime_secs: i64,
    pub environment: Environment,
    pub client_url: Option<String>,
    pub seed_on_startup: bool,
    pub password: PasswordConfig,
}

impl AppConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let environment = match lookup("APP_ENV") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "APP_ENV",
                value,
            })?,
            None => Environment::Development,
        };

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_or(&lookup, "PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_PARALLELISM", defaults.parallelism)?,
        };

        let token_lifetime_secs =
            parse_or(&lookup, "JWT_EXPIRES_IN_SECS", DEFAULT_TOKEN_LIFETIME_SECS)?;
        if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&token_lifetime_secs) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN_SECS",
                value: token_lifetime_secs.to_string(),
            });
        }

        let seed_default = store == StoreBackend::Memory;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            token_lifetime_secs,
            client_url: lookup("CLIENT_URL").filter(|url| !url.is_empty()),
            seed_on_startup: parse_or(&lookup, "SEED_ON_STARTUP", seed_default)?,
            store,
            jwt_secret,
            environment,
            password,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
