//! Claims carried by a verified-session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default token issuer
pub const DEFAULT_ISSUER: &str = "checkout-gate";

/// Claims structure for the session JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject id the verification was completed for
    pub sub: String,

    /// Verified E.164 phone number
    pub phone: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl SessionClaims {
    pub fn new(
        subject_id: impl Into<String>,
        phone: impl Into<String>,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: subject_id.into(),
            phone: phone.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: issuer.into(),
        }
    }

    /// Expired at or after `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_is_inclusive() {
        let now = Utc::now();
        let claims = SessionClaims::new("c1", "+15551230000", DEFAULT_ISSUER, now, now + Duration::minutes(30));

        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::minutes(30)));
    }
}
