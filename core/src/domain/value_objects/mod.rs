//! Value objects representing immutable domain concepts.

pub mod outcomes;

// Re-export commonly used types
pub use outcomes::{StartOutcome, VerifyOutcome};
