//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the CheckoutGate
//! backend. It provides concrete implementations of the storage, rate
//! limiting and collaborator traits declared in `cg_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL challenge store and rate limiter using SQLx
//! - **Cache**: Redis client and fixed-window rate limiter
//! - **Notifier**: code delivery adapters (log, HTTP relay)
//! - **Storefront**: checkout URL lookup over the Storefront GraphQL API
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL storage support (default)
//! - `redis-cache`: Enable Redis rate limiting support (default)

use cg_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and rate limiter
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Notifier module - code delivery adapters
pub mod notifier;

/// Storefront module - checkout URL resolver
pub mod storefront;

/// Backend selection and wiring
pub mod backends;

pub use backends::Backends;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<cg_shared::ConfigError> for InfrastructureError {
    fn from(err: cg_shared::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Config(message) => DomainError::Config { message },
            other => DomainError::storage(other),
        }
    }
}
