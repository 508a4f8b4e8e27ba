//! HS256 session token issuer

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::domain::entities::SessionClaims;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::services::clock::Clock;

use super::config::SessionTokenConfig;

/// Signs and validates tokens binding a subject id to a verified phone
pub struct SessionTokenIssuer {
    config: SessionTokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl SessionTokenIssuer {
    /// Creates a new issuer
    ///
    /// Expiry is checked against `clock` rather than the library's wall
    /// clock, so tests driving a `ManualClock` see consistent results.
    pub fn new(config: SessionTokenConfig, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        if config.secret.is_empty() {
            return Err(DomainError::Config {
                message: "session token secret must not be empty".to_string(),
            });
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            clock,
        })
    }

    /// Issue a token valid from now for the configured lifetime
    pub fn issue(&self, subject_id: &str, contact: &str) -> DomainResult<(String, DateTime<Utc>)> {
        let now = self.clock.now();
        let expires_at = now + self.config.ttl;
        let token = self.issue_at(subject_id, contact, now, expires_at)?;
        Ok((token, expires_at))
    }

    /// Issue a token with explicit instants
    pub fn issue_at(
        &self,
        subject_id: &str,
        contact: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<String> {
        let claims = SessionClaims::new(
            subject_id,
            contact,
            self.config.issuer.as_str(),
            issued_at,
            expires_at,
        );
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::SigningFailed))
    }

    /// Verify signature, issuer and expiry; any failure is `InvalidToken`
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::InvalidToken)?;

        if token_data.claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}
