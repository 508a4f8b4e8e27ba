//! Lockout entity: blocks verification for a subject until an instant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockout {
    pub subject_id: String,
    pub locked_until: DateTime<Utc>,
}

impl Lockout {
    /// Lockout starting at `now` for `duration`
    pub fn starting_at(subject_id: impl Into<String>, now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            subject_id: subject_id.into(),
            locked_until: now + duration,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.locked_until > now
    }
}
