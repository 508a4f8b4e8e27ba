//! MySQL fixed-window rate limiter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use std::sync::Arc;
use std::time::Duration;

use cg_core::domain::entities::RateLimitDecision;
use cg_core::errors::{DomainError, DomainResult};
use cg_core::services::{Clock, RateLimiterTrait};

/// Counts windows in the `rate_limit_windows` table
///
/// Reset-or-increment is a single upsert, so concurrent requests on one key
/// never lose a hit.
pub struct MySqlRateLimiter {
    pool: MySqlPool,
    clock: Arc<dyn Clock>,
}

impl MySqlRateLimiter {
    pub fn new(pool: MySqlPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl RateLimiterTrait for MySqlRateLimiter {
    async fn check(&self, key: &str, limit: u32, window: Duration) -> DomainResult<RateLimitDecision> {
        let window = chrono::Duration::from_std(window).map_err(|e| DomainError::Internal {
            message: format!("Invalid rate limit window: {}", e),
        })?;
        let now = self.clock.now();
        let fresh_expiry = now + window;

        let mut tx = self.pool.begin().await.map_err(DomainError::storage)?;

        // Columns are assigned left to right: `count` must still see the old expiry
        sqlx::query(
            r#"
            INSERT INTO rate_limit_windows (window_key, count, window_expires_at)
            VALUES (?, 1, ?)
            ON DUPLICATE KEY UPDATE
                count = IF(window_expires_at <= ?, 1, count + 1),
                window_expires_at = IF(window_expires_at <= ?, ?, window_expires_at)
            "#,
        )
        .bind(key)
        .bind(fresh_expiry)
        .bind(now)
        .bind(now)
        .bind(fresh_expiry)
        .execute(&mut *tx)
        .await
        .map_err(DomainError::storage)?;

        let row = sqlx::query("SELECT count, window_expires_at FROM rate_limit_windows WHERE window_key = ?")
            .bind(key)
            .fetch_one(&mut *tx)
            .await
            .map_err(DomainError::storage)?;

        tx.commit().await.map_err(DomainError::storage)?;

        let count: u64 = row.try_get("count").map_err(DomainError::storage)?;
        let reset_at: DateTime<Utc> = row.try_get("window_expires_at").map_err(DomainError::storage)?;

        let decision = RateLimitDecision::from_count(count, limit, reset_at);
        if !decision.allowed {
            tracing::debug!(key = key, count = count, limit = limit, "Rate window exhausted");
        }
        Ok(decision)
    }
}
