//! Successful results of the challenge engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A code was issued and handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOutcome {
    /// Handle for the challenge; equals the subject id
    pub challenge_id: String,

    /// Earliest instant another code may be requested
    pub resend_eligible_at: DateTime<Utc>,
}

/// The code matched; the subject is verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Signed session token
    pub token: String,

    /// Expiry of both the token and the verified session
    pub expires_at: DateTime<Utc>,

    /// Verified E.164 phone number
    pub contact: String,
}
