//! # CheckoutGate Core
//!
//! Core business logic for the CheckoutGate backend: the OTP challenge
//! engine, code codec, session tokens, rate limiting policy and the
//! checkout gate, together with the storage and collaborator traits the
//! infrastructure layer implements.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::*;
pub use services::*;
pub use repositories::*;
pub use errors::*;
