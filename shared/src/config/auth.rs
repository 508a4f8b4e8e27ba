//! Secret material for code digests and session tokens

use serde::{Deserialize, Serialize};

use super::{read_env, ConfigError};

/// Shortest secret accepted at startup
pub const MIN_SECRET_LENGTH: usize = 16;

/// Authentication configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HMAC key used for both code digests and HS256 session tokens
    pub hmac_secret: String,

    /// `iss` claim written into and required from session tokens
    #[serde(default = "default_issuer")]
    pub token_issuer: String,

    /// Name of the cookie carrying the session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Mark the session cookie `Secure` (HTTPS only)
    #[serde(default)]
    pub cookie_secure: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("hmac_secret", &"<redacted>")
            .field("token_issuer", &self.token_issuer)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl AuthConfig {
    /// Create a configuration around an already validated secret
    pub fn new(hmac_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let hmac_secret = hmac_secret.into();
        validate_secret(&hmac_secret)?;

        Ok(Self {
            hmac_secret,
            token_issuer: default_issuer(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
        })
    }

    /// Create from environment variables
    ///
    /// `OTP_HMAC_SECRET` has no default: the server refuses to start without it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = read_env("OTP_HMAC_SECRET").ok_or_else(|| ConfigError::Missing {
            name: "OTP_HMAC_SECRET".to_string(),
        })?;

        let mut config = Self::new(secret)?;
        if let Some(issuer) = read_env("OTP_TOKEN_ISSUER") {
            config.token_issuer = issuer;
        }
        if let Some(cookie_name) = read_env("OTP_COOKIE_NAME") {
            config.cookie_name = cookie_name;
        }
        config.cookie_secure = read_env("OTP_COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(config)
    }
}

fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::Invalid {
            name: "OTP_HMAC_SECRET".to_string(),
            reason: format!("must be at least {} bytes", MIN_SECRET_LENGTH),
        });
    }
    Ok(())
}

fn default_issuer() -> String {
    String::from("checkout-gate")
}

fn default_cookie_name() -> String {
    String::from("otp_token")
}
