//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{AccessError, ChallengeError, DeliveryError, ResolveError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    /// Persistence failure; surfaced to clients as a generic server error
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Access(#[from] AccessError),
}

impl DomainError {
    /// Build a storage error from any displayable cause
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        DomainError::Storage {
            message: cause.to_string(),
        }
    }

    /// The challenge outcome carried by this error, if any
    pub fn as_challenge(&self) -> Option<&ChallengeError> {
        match self {
            DomainError::Challenge(e) => Some(e),
            _ => None,
        }
    }
}

impl From<cg_shared::ConfigError> for DomainError {
    fn from(err: cg_shared::ConfigError) -> Self {
        DomainError::Config {
            message: err.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
