//! Redis fixed-window rate limiter

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use redis::Script;
use std::sync::Arc;
use std::time::Duration;

use cg_core::domain::entities::RateLimitDecision;
use cg_core::errors::{DomainError, DomainResult};
use cg_core::services::{Clock, RateLimiterTrait};

use super::redis_client::RedisClient;

/// Increment the window counter, starting the window on the first hit.
///
/// ARGV[1] is the caller's clock in epoch ms, ARGV[2] the window in ms.
/// The window end is fixed when the window starts and stored next to the
/// count, so every hit in a window reports the same reset instant.
/// Returns the new count and that instant in epoch ms.
const FIXED_WINDOW_SCRIPT: &str = r#"
local count = redis.call('HINCRBY', KEYS[1], 'count', 1)
local reset = tonumber(redis.call('HGET', KEYS[1], 'reset'))
if count == 1 or not reset or redis.call('PTTL', KEYS[1]) < 0 then
    reset = tonumber(ARGV[1]) + tonumber(ARGV[2])
    redis.call('HSET', KEYS[1], 'reset', reset)
    redis.call('PEXPIRE', KEYS[1], ARGV[2])
end
return {count, reset}
"#;

/// Counts windows in Redis hashes that expire with the window
///
/// The counter update runs as one script, so it is atomic across every
/// instance sharing the Redis server.
pub struct RedisRateLimiter {
    redis_client: Arc<RedisClient>,
    script: Script,
    clock: Arc<dyn Clock>,
}

impl RedisRateLimiter {
    pub fn new(redis_client: Arc<RedisClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            redis_client,
            script: Script::new(FIXED_WINDOW_SCRIPT),
            clock,
        }
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check(&self, key: &str, limit: u32, window: Duration) -> DomainResult<RateLimitDecision> {
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1);
        let now_ms = self.clock.now().timestamp_millis();
        let key = self.redis_client.make_key(key);
        let mut conn = self.redis_client.get_connection();

        // Not retried: a repeated HINCRBY would count the request twice
        let (count, reset_ms): (u64, i64) = self
            .script
            .key(&key)
            .arg(now_ms)
            .arg(window_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::Storage {
                message: format!("Failed to update rate window: {}", e),
            })?;

        let reset_at = Utc
            .timestamp_millis_opt(reset_ms)
            .single()
            .ok_or_else(|| DomainError::Internal {
                message: format!("Rate window reset out of range: {}", reset_ms),
            })?;
        Ok(RateLimitDecision::from_count(count, limit, reset_at))
    }
}
