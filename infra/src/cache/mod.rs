//! Cache module for Redis-backed rate limiting
//!
//! Provides a Redis client with connection retry and a fixed-window rate
//! limiter that runs its reset-or-increment as one Lua script.

pub mod rate_limiter;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use rate_limiter::RedisRateLimiter;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use cg_shared::config::CacheConfig;
