pub mod challenge;

pub use challenge::{ChallengeStore, FailedAttempt, InMemoryChallengeStore};
