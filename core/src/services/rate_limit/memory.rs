//! Process-local fixed-window rate limiter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::entities::{RateLimitDecision, RateWindow};
use crate::errors::{DomainError, DomainResult};
use crate::services::clock::Clock;

use super::r#trait::RateLimiterTrait;

/// In-memory `RateLimiterTrait` for development and tests
pub struct InMemoryRateLimiter<C: Clock + ?Sized> {
    windows: Mutex<HashMap<String, RateWindow>>,
    clock: Arc<C>,
}

impl<C: Clock + ?Sized> InMemoryRateLimiter<C> {
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl<C: Clock + ?Sized> RateLimiterTrait for InMemoryRateLimiter<C> {
    async fn check(&self, key: &str, limit: u32, window: Duration) -> DomainResult<RateLimitDecision> {
        let window = chrono::Duration::from_std(window).map_err(|e| DomainError::Internal {
            message: format!("Invalid rate limit window: {}", e),
        })?;
        let now = self.clock.now();

        let mut windows = self.windows.lock().await;
        let next = RateWindow::hit(windows.get(key), key, now, window);
        let decision = next.decide(limit);
        windows.insert(key.to_string(), next);

        Ok(decision)
    }
}
