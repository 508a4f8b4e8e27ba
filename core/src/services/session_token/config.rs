//! Configuration for the session token issuer

use chrono::Duration;

use cg_shared::config::{AuthConfig, OtpConfig};

use crate::domain::entities::DEFAULT_ISSUER;

/// Configuration for the session token issuer
#[derive(Clone)]
pub struct SessionTokenConfig {
    /// HS256 signing secret
    pub secret: String,
    /// `iss` claim written and required
    pub issuer: String,
    /// Token lifetime, equal to the verified session lifetime
    pub ttl: Duration,
}

impl std::fmt::Debug for SessionTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenConfig")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            ttl: Duration::minutes(30),
        }
    }

    pub fn from_app(auth: &AuthConfig, otp: &OtpConfig) -> Self {
        Self {
            secret: auth.hmac_secret.clone(),
            issuer: auth.token_issuer.clone(),
            ttl: Duration::seconds(otp.session_ttl_seconds as i64),
        }
    }
}
