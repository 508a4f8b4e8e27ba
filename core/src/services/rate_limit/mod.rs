//! Fixed-window rate limiting for challenge start and verify

mod memory;
mod policy;
mod r#trait;

#[cfg(test)]
mod tests;

pub use memory::InMemoryRateLimiter;
pub use policy::{hash_contact, window_key, RateLimitAction, RateLimitPolicy};
pub use r#trait::RateLimiterTrait;
