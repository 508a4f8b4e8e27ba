//! Configuration for the challenge engine

use chrono::Duration;

use cg_shared::config::OtpConfig;

/// Policy knobs of the challenge engine
#[derive(Debug, Clone)]
pub struct ChallengeEngineConfig {
    /// Lifetime of an issued code
    pub code_ttl: Duration,
    /// Minimum gap between two codes for one subject
    pub resend_cooldown: Duration,
    /// Failed verifications before lockout
    pub attempt_limit: u32,
    /// How long a lockout lasts
    pub lockout_duration: Duration,
    /// Lifetime of a verified session
    pub session_ttl: Duration,
    /// Delivery attempts, including the first
    pub delivery_max_attempts: u32,
    /// Sleep before the first retry; doubled for each further retry
    pub delivery_backoff: std::time::Duration,
    /// Upper bound on a single delivery attempt
    pub delivery_timeout: std::time::Duration,
}

impl Default for ChallengeEngineConfig {
    fn default() -> Self {
        Self::from(&OtpConfig::default())
    }
}

impl From<&OtpConfig> for ChallengeEngineConfig {
    fn from(otp: &OtpConfig) -> Self {
        Self {
            code_ttl: Duration::seconds(otp.code_ttl_seconds as i64),
            resend_cooldown: Duration::seconds(otp.resend_cooldown_seconds as i64),
            attempt_limit: otp.attempt_limit,
            lockout_duration: Duration::seconds(otp.lockout_seconds as i64),
            session_ttl: Duration::seconds(otp.session_ttl_seconds as i64),
            delivery_max_attempts: otp.delivery_max_attempts.max(1),
            delivery_backoff: std::time::Duration::from_millis(otp.delivery_backoff_ms),
            delivery_timeout: std::time::Duration::from_millis(otp.delivery_timeout_ms),
        }
    }
}
