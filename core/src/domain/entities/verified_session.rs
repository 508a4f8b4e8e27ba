//! Verified session entity: proof that a subject completed verification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedSession {
    pub subject_id: String,

    /// E.164 phone number that was verified
    pub contact: String,

    pub verified_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl VerifiedSession {
    /// Session verified at `now`, valid for `ttl`
    pub fn verified_at(
        subject_id: impl Into<String>,
        contact: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            contact: contact.into(),
            verified_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
