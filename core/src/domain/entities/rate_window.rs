//! Fixed rate-limit window and the decision derived from it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Counter for one key within one fixed window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub key: String,
    pub count: u64,
    pub window_expires_at: DateTime<Utc>,
}

impl RateWindow {
    /// Count one more hit at `now`
    ///
    /// A window that has ended (or never existed) restarts at 1.
    pub fn hit(existing: Option<&RateWindow>, key: &str, now: DateTime<Utc>, window: Duration) -> Self {
        match existing {
            Some(current) if current.window_expires_at > now => Self {
                key: key.to_string(),
                count: current.count + 1,
                window_expires_at: current.window_expires_at,
            },
            _ => Self {
                key: key.to_string(),
                count: 1,
                window_expires_at: now + window,
            },
        }
    }

    pub fn decide(&self, limit: u32) -> RateLimitDecision {
        RateLimitDecision::from_count(self.count, limit, self.window_expires_at)
    }
}

/// Result of one rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    pub allowed: bool,

    /// `limit - count`; negative once over the limit, callers clamp
    pub remaining: i64,

    /// End of the current window
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    pub fn from_count(count: u64, limit: u32, reset_at: DateTime<Utc>) -> Self {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        Self {
            allowed: count <= i64::from(limit),
            remaining: i64::from(limit) - count,
            reset_at,
        }
    }
}
