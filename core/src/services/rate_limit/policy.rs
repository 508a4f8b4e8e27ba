//! Ordered evaluation of the configured rate-limit rules

use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use cg_shared::config::{RateLimitConfig, RateLimitRule, RateLimitScope};

use crate::errors::{ChallengeError, DomainResult};

use super::r#trait::RateLimiterTrait;

/// Protected engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitAction {
    Start,
    Verify,
}

impl RateLimitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitAction::Start => "start",
            RateLimitAction::Verify => "verify",
        }
    }
}

/// Applies the rules for an action against a `RateLimiterTrait`
pub struct RateLimitPolicy<R: RateLimiterTrait + ?Sized> {
    limiter: Arc<R>,
    config: RateLimitConfig,
}

impl<R: RateLimiterTrait + ?Sized> RateLimitPolicy<R> {
    pub fn new(limiter: Arc<R>, config: RateLimitConfig) -> Self {
        Self { limiter, config }
    }

    /// Count this request against every rule of `action`, in order
    ///
    /// Stops at the first denial and reports its window end. Contact rules
    /// are skipped when no contact is known for the request.
    pub async fn enforce(
        &self,
        action: RateLimitAction,
        origin: &str,
        contact: Option<&str>,
    ) -> DomainResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let rules = match action {
            RateLimitAction::Start => &self.config.start,
            RateLimitAction::Verify => &self.config.verify,
        };

        for rule in rules {
            let value = match rule.scope {
                RateLimitScope::Origin => origin.to_string(),
                RateLimitScope::Contact => match contact {
                    Some(contact) => hash_contact(contact),
                    None => continue,
                },
            };

            let key = window_key(action, rule, &value);
            let decision = self
                .limiter
                .check(&key, rule.limit, Duration::from_secs(rule.window_seconds))
                .await?;

            if !decision.allowed {
                tracing::warn!(
                    action = action.as_str(),
                    scope = rule.scope.as_str(),
                    window_seconds = rule.window_seconds,
                    reset_at = %decision.reset_at,
                    event = "otp_rate_limited",
                    "Rate limit exceeded"
                );
                return Err(ChallengeError::RateLimited {
                    reset_at: decision.reset_at,
                }
                .into());
            }
        }

        Ok(())
    }
}

/// `rl:{action}:{scope}:{window}s:{value}`
pub fn window_key(action: RateLimitAction, rule: &RateLimitRule, value: &str) -> String {
    format!(
        "rl:{}:{}:{}s:{}",
        action.as_str(),
        rule.scope.as_str(),
        rule.window_seconds,
        value
    )
}

/// Phone numbers never appear in keys in clear
pub fn hash_contact(contact: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contact.as_bytes());
    format!("{:x}", hasher.finalize())
}
