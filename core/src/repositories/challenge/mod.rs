//! Challenge repository module.

mod r#trait;
pub use r#trait::{ChallengeStore, FailedAttempt};

mod memory;
pub use memory::InMemoryChallengeStore;

#[cfg(test)]
mod tests;
