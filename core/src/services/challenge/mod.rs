//! Challenge engine module
//!
//! This module owns the OTP lifecycle for a subject:
//! - Code issuance with a resend cooldown
//! - Delivery with bounded retries and rollback
//! - Verification with attempt counting and lockout
//! - Verified session creation and token issuance

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::ChallengeEngineConfig;
pub use service::ChallengeEngine;
