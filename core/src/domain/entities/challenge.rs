//! OTP challenge entity: one outstanding code per subject.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of the numeric code
pub const CODE_LENGTH: usize = 6;

/// A code is exactly `CODE_LENGTH` ASCII digits
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// An outstanding one-time passcode challenge
///
/// Only the digest of the code is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Subject the code was issued for (a cart id); primary key
    pub subject_id: String,

    /// E.164 phone number the code was delivered to
    pub contact: String,

    /// Keyed digest of the code, lowercase hex
    pub code_digest: String,

    /// Failed verification attempts so far
    pub attempts: u32,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Earliest instant at which a new code may be issued
    pub resend_eligible_at: DateTime<Utc>,

    /// Client address that requested the code
    pub request_origin: String,
}

impl Challenge {
    /// Creates a fresh challenge issued at `now`
    ///
    /// The resend instant is clamped so it never falls after expiry.
    pub fn issue(
        subject_id: impl Into<String>,
        contact: impl Into<String>,
        code_digest: impl Into<String>,
        request_origin: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
        resend_cooldown: Duration,
    ) -> Self {
        let expires_at = now + ttl;
        let resend_eligible_at = std::cmp::min(now + resend_cooldown, expires_at);

        Self {
            subject_id: subject_id.into(),
            contact: contact.into(),
            code_digest: code_digest.into(),
            attempts: 0,
            created_at: now,
            expires_at,
            resend_eligible_at,
            request_origin: request_origin.into(),
        }
    }

    /// Live means strictly before expiry
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whether the resend cooldown is still running
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        now < self.resend_eligible_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Challenge {
        Challenge::issue(
            "c1",
            "+15551230000",
            "ab".repeat(32),
            "10.0.0.1",
            now,
            Duration::seconds(300),
            Duration::seconds(45),
        )
    }

    #[test]
    fn test_issue_sets_instants() {
        let now = Utc::now();
        let challenge = sample(now);

        assert_eq!(challenge.attempts, 0);
        assert_eq!(challenge.expires_at, now + Duration::seconds(300));
        assert_eq!(challenge.resend_eligible_at, now + Duration::seconds(45));
        assert!(challenge.resend_eligible_at <= challenge.expires_at);
    }

    #[test]
    fn test_resend_never_after_expiry() {
        let now = Utc::now();
        let challenge = Challenge::issue(
            "c1",
            "+15551230000",
            "00",
            "ip",
            now,
            Duration::seconds(30),
            Duration::seconds(60),
        );
        assert_eq!(challenge.resend_eligible_at, challenge.expires_at);
    }

    #[test]
    fn test_liveness_boundary() {
        let now = Utc::now();
        let challenge = sample(now);

        assert!(challenge.is_live(now + Duration::seconds(299)));
        assert!(!challenge.is_live(challenge.expires_at));
        assert!(challenge.in_cooldown(now + Duration::seconds(44)));
        assert!(!challenge.in_cooldown(now + Duration::seconds(45)));
    }

    #[test]
    fn test_code_shape() {
        assert!(is_well_formed_code("012345"));
        assert!(!is_well_formed_code(""));
        assert!(!is_well_formed_code("abc"));
        assert!(!is_well_formed_code("12345"));
        assert!(!is_well_formed_code("1234567"));
        assert!(!is_well_formed_code("99999x"));
        assert!(!is_well_formed_code("١٢٣٤٥٦"));
    }
}
