//! Rate limiter trait

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::RateLimitDecision;
use crate::errors::DomainResult;

/// Fixed-window counter keyed by arbitrary strings
///
/// `check` counts the request and decides in one atomic step: a missing or
/// ended window restarts at 1, otherwise the count is incremented and the
/// window end is left untouched. Windows are never deleted eagerly.
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    async fn check(&self, key: &str, limit: u32, window: Duration) -> DomainResult<RateLimitDecision>;
}
