//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical business areas:
//! - `auth` - Digest and session-token secret material
//! - `cache` - Redis configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Challenge lifetimes, attempt policy and delivery retries
//! - `rate_limit` - Fixed-window rules for start and verify
//! - `server` - HTTP server and external collaborator configuration

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod otp;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::AuthConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use rate_limit::{RateLimitConfig, RateLimitRule, RateLimitScope};
pub use server::{NotifierConfig, NotifierKind, ServerConfig, StorefrontConfig};

/// Startup-time configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {name}")]
    Missing { name: String },

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Where challenges, lockouts and verified sessions are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps, for development and tests only
    Memory,
    /// MySQL via SQLx
    Mysql,
}

/// Where fixed rate-limit windows are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    Memory,
    Mysql,
    Redis,
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// Secret material
    pub auth: AuthConfig,

    /// Challenge policy
    pub otp: OtpConfig,

    /// Rate limiting rules
    pub rate_limit: RateLimitConfig,

    /// Code delivery
    pub notifier: NotifierConfig,

    /// Checkout URL lookup
    pub storefront: StorefrontConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    pub storage_backend: StorageBackend,

    pub rate_limit_backend: RateLimitBackend,
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// Fails when the secret material is missing or any policy value is
    /// inconsistent; the server must not start in that state.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();

        let storage_backend = match read_env("STORAGE_BACKEND").as_deref() {
            None | Some("mysql") => StorageBackend::Mysql,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND".to_string(),
                    reason: format!("unknown backend '{}'", other),
                })
            }
        };

        let rate_limit_backend = match read_env("RATE_LIMIT_BACKEND").as_deref() {
            None => match storage_backend {
                StorageBackend::Memory => RateLimitBackend::Memory,
                StorageBackend::Mysql => RateLimitBackend::Mysql,
            },
            Some("memory") => RateLimitBackend::Memory,
            Some("mysql") => RateLimitBackend::Mysql,
            Some("redis") => RateLimitBackend::Redis,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "RATE_LIMIT_BACKEND".to_string(),
                    reason: format!("unknown backend '{}'", other),
                })
            }
        };

        if environment.is_production()
            && (storage_backend == StorageBackend::Memory
                || rate_limit_backend == RateLimitBackend::Memory)
        {
            return Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND".to_string(),
                reason: "in-memory storage is not allowed in production".to_string(),
            });
        }

        let otp = OtpConfig::from_env()?;
        otp.validate()?;

        let config = Self {
            environment,
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            auth: AuthConfig::from_env()?,
            otp,
            rate_limit: RateLimitConfig::from_env()?,
            notifier: NotifierConfig::from_env(),
            storefront: StorefrontConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
            storage_backend,
            rate_limit_backend,
        };

        Ok(config)
    }
}

/// Read a trimmed, non-empty environment variable
pub(crate) fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse an optional environment variable, falling back to `default`
pub(crate) fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match read_env(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
