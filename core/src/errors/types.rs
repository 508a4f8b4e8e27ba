//! Error types for the challenge lifecycle, session tokens and collaborators
//!
//! Messages here are for logs. The presentation layer chooses what the
//! client sees.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Outcomes of `start` / `verify` that are not success
///
/// Every policy variant that has a retry instant carries it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("Invalid input: {field}")]
    InvalidInput { field: String },

    #[error("Rate limit exceeded until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Resend not allowed before {resend_eligible_at}")]
    ResendTooSoon {
        challenge_id: String,
        resend_eligible_at: DateTime<Utc>,
    },

    #[error("Code delivery failed")]
    DeliveryFailed,

    #[error("Verification locked until {locked_until}")]
    Locked { locked_until: DateTime<Utc> },

    #[error("No active challenge")]
    NotFound,

    #[error("Challenge expired")]
    Expired,

    #[error("Invalid code ({attempts} attempts, {remaining} remaining)")]
    InvalidCode { attempts: u32, remaining: u32 },
}

/// Session token errors
///
/// Validation failures are deliberately collapsed into a single variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token signing failed")]
    SigningFailed,
}

/// Failures reported by a notifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The channel refused the message; retrying will not help
    #[error("Delivery rejected: {message}")]
    Rejected { message: String },

    /// Transient failure
    #[error("Delivery channel unavailable: {message}")]
    Unavailable { message: String },

    #[error("Delivery timed out")]
    Timeout,
}

/// Failures of the subject attribute resolver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Subject not found")]
    NotFound,

    #[error("Upstream failure: {message}")]
    Upstream { message: String },
}

/// Checkout gate refusals
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Token valid but no live verified session, or bound to another subject
    #[error("Subject not verified")]
    NotVerified,

    #[error("Resolving subject attribute failed: {0}")]
    ResolveFailed(#[from] ResolveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_code_message_reports_counts() {
        let error = ChallengeError::InvalidCode {
            attempts: 2,
            remaining: 3,
        };
        assert_eq!(error.to_string(), "Invalid code (2 attempts, 3 remaining)");
    }

    #[test]
    fn test_resolve_error_converts_into_access_error() {
        let error: AccessError = ResolveError::NotFound.into();
        assert_eq!(error, AccessError::ResolveFailed(ResolveError::NotFound));
    }
}
