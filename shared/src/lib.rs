//! Shared utilities and common types for CheckoutGate server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures
//! - Utility functions (phone normalization and masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, LogFormat,
    LoggingConfig, NotifierConfig, NotifierKind, OtpConfig, RateLimitBackend, RateLimitConfig, RateLimitRule,
    RateLimitScope, ServerConfig, StorageBackend, StorefrontConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::phone;
