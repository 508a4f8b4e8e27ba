//! One-time passcode policy configuration

use serde::{Deserialize, Serialize};

use super::{parse_env, ConfigError};

/// Longest lifetime, cooldown or lockout accepted from configuration (30 days)
pub const MAX_DURATION_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Challenge lifetimes, attempt policy and delivery retries
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// How long an issued code stays valid
    pub code_ttl_seconds: u64,

    /// Minimum gap between two codes for the same subject
    pub resend_cooldown_seconds: u64,

    /// Failed verifications allowed before the subject is locked
    pub attempt_limit: u32,

    /// Lockout duration once the attempt limit is reached
    pub lockout_seconds: u64,

    /// Lifetime of a verified session and of the token bound to it
    pub session_ttl_seconds: u64,

    /// Total delivery attempts, including the first
    pub delivery_max_attempts: u32,

    /// Delay before the first delivery retry, doubled for each further retry
    pub delivery_backoff_ms: u64,

    /// Upper bound on a single delivery attempt
    pub delivery_timeout_ms: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: 300,        // 5 minutes
            resend_cooldown_seconds: 45,
            attempt_limit: 5,
            lockout_seconds: 900,         // 15 minutes
            session_ttl_seconds: 1800,    // 30 minutes
            delivery_max_attempts: 3,
            delivery_backoff_ms: 500,
            delivery_timeout_ms: 10_000,
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            code_ttl_seconds: parse_env("OTP_TTL_SECONDS", d.code_ttl_seconds)?,
            resend_cooldown_seconds: parse_env("OTP_RESEND_COOLDOWN_SECONDS", d.resend_cooldown_seconds)?,
            attempt_limit: parse_env("OTP_ATTEMPT_LIMIT", d.attempt_limit)?,
            lockout_seconds: parse_env("OTP_LOCK_SECONDS", d.lockout_seconds)?,
            session_ttl_seconds: parse_env("OTP_SESSION_TTL_SECONDS", d.session_ttl_seconds)?,
            delivery_max_attempts: parse_env("OTP_DELIVERY_MAX_ATTEMPTS", d.delivery_max_attempts)?,
            delivery_backoff_ms: parse_env("OTP_DELIVERY_BACKOFF_MS", d.delivery_backoff_ms)?,
            delivery_timeout_ms: parse_env("OTP_DELIVERY_TIMEOUT_MS", d.delivery_timeout_ms)?,
        })
    }

    /// Reject inconsistent combinations
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &str, reason: &str| ConfigError::Invalid {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        for (name, seconds) in [
            ("OTP_TTL_SECONDS", self.code_ttl_seconds),
            ("OTP_RESEND_COOLDOWN_SECONDS", self.resend_cooldown_seconds),
            ("OTP_LOCK_SECONDS", self.lockout_seconds),
            ("OTP_SESSION_TTL_SECONDS", self.session_ttl_seconds),
        ] {
            if seconds > MAX_DURATION_SECONDS {
                return Err(invalid(name, "must not exceed 30 days"));
            }
        }

        if self.code_ttl_seconds == 0 {
            return Err(invalid("OTP_TTL_SECONDS", "must be positive"));
        }
        if self.resend_cooldown_seconds > self.code_ttl_seconds {
            return Err(invalid(
                "OTP_RESEND_COOLDOWN_SECONDS",
                "must not exceed the code lifetime",
            ));
        }
        if self.attempt_limit == 0 {
            return Err(invalid("OTP_ATTEMPT_LIMIT", "must be positive"));
        }
        if self.session_ttl_seconds == 0 {
            return Err(invalid("OTP_SESSION_TTL_SECONDS", "must be positive"));
        }
        if self.delivery_max_attempts == 0 {
            return Err(invalid("OTP_DELIVERY_MAX_ATTEMPTS", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OtpConfig::default();
        assert_eq!(config.code_ttl_seconds, 300);
        assert_eq!(config.resend_cooldown_seconds, 45);
        assert_eq!(config.attempt_limit, 5);
        assert_eq!(config.lockout_seconds, 900);
        assert_eq!(config.session_ttl_seconds, 1800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cooldown_longer_than_ttl_is_rejected() {
        let config = OtpConfig {
            code_ttl_seconds: 30,
            resend_cooldown_seconds: 60,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempt_limit_is_rejected() {
        let config = OtpConfig {
            attempt_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durations_are_bounded() {
        let config = OtpConfig {
            session_ttl_seconds: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref name, .. }) if name == "OTP_SESSION_TTL_SECONDS"
        ));

        let config = OtpConfig {
            lockout_seconds: MAX_DURATION_SECONDS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = OtpConfig {
            lockout_seconds: MAX_DURATION_SECONDS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
