//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management and migrations
//! - The durable challenge store
//! - A fixed-window rate limiter backed by a single table

pub mod challenge_store;
pub mod connection;
pub mod rate_limiter;


// Re-export commonly used types
pub use challenge_store::MySqlChallengeStore;
pub use connection::DatabasePool;
pub use rate_limiter::MySqlRateLimiter;
