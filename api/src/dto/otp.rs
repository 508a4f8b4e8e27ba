use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use cg_core::domain::value_objects::{StartOutcome, VerifyOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Cart the code is issued for
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "cartId is required"))]
    pub cart_id: String,

    /// Phone number in international format, e.g. "+15551230000" or "0015551230000"
    #[serde(default)]
    #[validate(length(min = 1, max = 32, message = "phone is required"))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub challenge_id: String,
    /// Earliest instant another code may be requested
    pub resend_at: DateTime<Utc>,
}

impl From<StartOutcome> for StartResponse {
    fn from(outcome: StartOutcome) -> Self {
        Self {
            challenge_id: outcome.challenge_id,
            resend_at: outcome.resend_eligible_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "cartId is required"))]
    pub cart_id: String,

    /// The 6-digit code; the engine rejects anything but six ASCII digits
    #[serde(default)]
    #[validate(length(min = 1, max = 16, message = "code is required"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<VerifyOutcome> for VerifyResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        Self {
            token: outcome.token,
            expires_at: outcome.expires_at,
        }
    }
}
