//! Challenge engine: the start / verify / lock state machine

use std::sync::Arc;

use cg_shared::config::RateLimitConfig;
use cg_shared::utils::{is_valid_subject_id, mask_phone_number, normalize_to_e164};

use crate::domain::entities::{is_well_formed_code, Challenge, Lockout, VerifiedSession};
use crate::domain::value_objects::{StartOutcome, VerifyOutcome};
use crate::errors::{ChallengeError, DeliveryError, DomainError, DomainResult};
use crate::repositories::ChallengeStore;
use crate::services::clock::Clock;
use crate::services::codec::CodeCodec;
use crate::services::notifier::NotifierTrait;
use crate::services::rate_limit::{RateLimitAction, RateLimitPolicy, RateLimiterTrait};
use crate::services::session_token::SessionTokenIssuer;

use super::config::ChallengeEngineConfig;

/// Orchestrates the OTP challenge lifecycle for subjects (cart ids)
///
/// Holds no per-subject state of its own: every decision is made from what
/// the store returns for the current call.
pub struct ChallengeEngine<S, R, N>
where
    S: ChallengeStore + ?Sized,
    R: RateLimiterTrait + ?Sized,
    N: NotifierTrait + ?Sized,
{
    store: Arc<S>,
    rate_limits: RateLimitPolicy<R>,
    notifier: Arc<N>,
    codec: CodeCodec,
    tokens: Arc<SessionTokenIssuer>,
    clock: Arc<dyn Clock>,
    config: ChallengeEngineConfig,
}

impl<S, R, N> ChallengeEngine<S, R, N>
where
    S: ChallengeStore + ?Sized,
    R: RateLimiterTrait + ?Sized,
    N: NotifierTrait + ?Sized,
{
    /// Create a new challenge engine
    ///
    /// # Arguments
    ///
    /// * `store` - Durable challenge, lockout and session storage
    /// * `limiter` - Fixed-window counter shared by all instances
    /// * `notifier` - Delivery channel for raw codes
    /// * `codec` - Code generator and digester
    /// * `tokens` - Session token issuer
    /// * `clock` - Time source
    /// * `config` - Lifetimes, attempt policy and delivery retries
    /// * `rate_limit_config` - Ordered rules for start and verify
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<S>,
        limiter: Arc<R>,
        notifier: Arc<N>,
        codec: CodeCodec,
        tokens: Arc<SessionTokenIssuer>,
        clock: Arc<dyn Clock>,
        config: ChallengeEngineConfig,
        rate_limit_config: RateLimitConfig,
    ) -> Self {
        Self {
            store,
            rate_limits: RateLimitPolicy::new(limiter, rate_limit_config),
            notifier,
            codec,
            tokens,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ChallengeEngineConfig {
        &self.config
    }

    /// Issue a code for `subject_id` and deliver it to `contact`
    ///
    /// This method:
    /// 1. Validates the subject id and normalizes the contact to E.164
    /// 2. Applies the start rate limits (origin, then contact)
    /// 3. Refuses while a live challenge is still in its resend cooldown
    /// 4. Stores a fresh challenge, replacing any previous one
    /// 5. Delivers the code with bounded retries, rolling back on failure
    pub async fn start(&self, subject_id: &str, contact: &str, origin: &str) -> DomainResult<StartOutcome> {
        if !is_valid_subject_id(subject_id) {
            return Err(invalid_input("subject_id"));
        }
        let contact = normalize_to_e164(contact).ok_or_else(|| invalid_input("contact"))?;

        self.rate_limits
            .enforce(RateLimitAction::Start, origin, Some(&contact))
            .await?;

        let now = self.clock.now();
        if let Some(existing) = self.store.get_challenge(subject_id).await? {
            if existing.is_live(now) && existing.in_cooldown(now) {
                tracing::info!(
                    subject_id = subject_id,
                    resend_eligible_at = %existing.resend_eligible_at,
                    event = "otp_resend_too_soon",
                    "Code requested during resend cooldown"
                );
                return Err(ChallengeError::ResendTooSoon {
                    challenge_id: existing.subject_id,
                    resend_eligible_at: existing.resend_eligible_at,
                }
                .into());
            }
        }

        let code = self.codec.generate();
        let challenge = Challenge::issue(
            subject_id,
            contact.as_str(),
            self.codec.digest(&code),
            origin,
            now,
            self.config.code_ttl,
            self.config.resend_cooldown,
        );
        self.store.upsert_challenge(&challenge).await?;

        match self.deliver(subject_id, &contact, &code).await {
            Ok(message_id) => {
                tracing::info!(
                    subject_id = subject_id,
                    phone = %mask_phone_number(&contact),
                    message_id = %message_id,
                    event = "otp_started",
                    "Verification code issued"
                );
                Ok(StartOutcome {
                    challenge_id: challenge.subject_id,
                    resend_eligible_at: challenge.resend_eligible_at,
                })
            }
            Err(e) => {
                tracing::error!(
                    subject_id = subject_id,
                    phone = %mask_phone_number(&contact),
                    error = %e,
                    event = "otp_delivery_failed",
                    "Code delivery failed, discarding challenge"
                );
                // A concurrent start may already have replaced this challenge
                self.store
                    .discard_challenge(subject_id, &challenge.code_digest)
                    .await?;
                Err(ChallengeError::DeliveryFailed.into())
            }
        }
    }

    /// Check `code` against the subject's live challenge
    ///
    /// On success the challenge is consumed, a verified session is stored
    /// and a signed token binding subject and phone is returned.
    pub async fn verify(&self, subject_id: &str, code: &str, origin: &str) -> DomainResult<VerifyOutcome> {
        if !is_valid_subject_id(subject_id) {
            return Err(invalid_input("subject_id"));
        }
        let code = code.trim();
        if !is_well_formed_code(code) {
            return Err(invalid_input("code"));
        }

        self.rate_limits
            .enforce(RateLimitAction::Verify, origin, None)
            .await?;

        let now = self.clock.now();

        if let Some(lockout) = self.store.get_lockout(subject_id, now).await? {
            tracing::warn!(
                subject_id = subject_id,
                locked_until = %lockout.locked_until,
                event = "otp_locked",
                "Verification attempted while locked"
            );
            return Err(ChallengeError::Locked {
                locked_until: lockout.locked_until,
            }
            .into());
        }

        let challenge = match self.store.get_challenge(subject_id).await? {
            Some(challenge) => challenge,
            None => return Err(ChallengeError::NotFound.into()),
        };

        if !challenge.is_live(now) {
            tracing::info!(
                subject_id = subject_id,
                expired_at = %challenge.expires_at,
                event = "otp_expired",
                "Verification attempted on expired challenge"
            );
            self.store
                .discard_challenge(subject_id, &challenge.code_digest)
                .await?;
            return Err(ChallengeError::Expired.into());
        }

        let lockout = Lockout::starting_at(subject_id, now, self.config.lockout_duration);

        if challenge.attempts >= self.config.attempt_limit {
            self.store.escalate_lockout(&lockout).await?;
            return Err(self.locked(subject_id, &lockout));
        }

        if !self.codec.matches(code, &challenge.code_digest) {
            let failed = self
                .store
                .record_failed_attempt(
                    subject_id,
                    &challenge.code_digest,
                    self.config.attempt_limit,
                    &lockout,
                )
                .await?;

            return Err(match failed {
                None => ChallengeError::NotFound.into(),
                Some(f) if f.locked => self.locked(subject_id, &lockout),
                Some(f) => {
                    let remaining = self.config.attempt_limit.saturating_sub(f.attempts);
                    tracing::warn!(
                        subject_id = subject_id,
                        attempts = f.attempts,
                        remaining = remaining,
                        event = "otp_invalid_code",
                        "Invalid verification code"
                    );
                    ChallengeError::InvalidCode {
                        attempts: f.attempts,
                        remaining,
                    }
                    .into()
                }
            });
        }

        let session = VerifiedSession::verified_at(
            subject_id,
            challenge.contact.as_str(),
            now,
            self.config.session_ttl,
        );
        let token = self
            .tokens
            .issue_at(subject_id, &challenge.contact, now, session.expires_at)?;

        if !self
            .store
            .consume_challenge(subject_id, &challenge.code_digest, &session)
            .await?
        {
            return Err(ChallengeError::NotFound.into());
        }

        tracing::info!(
            subject_id = subject_id,
            phone = %mask_phone_number(&challenge.contact),
            expires_at = %session.expires_at,
            event = "otp_verified",
            "Verification succeeded"
        );

        Ok(VerifyOutcome {
            token,
            expires_at: session.expires_at,
            contact: session.contact,
        })
    }

    /// Hand the code to the notifier, retrying transient failures
    ///
    /// Each attempt is bounded by the delivery timeout. The sleep before
    /// retry `n` is `backoff * 2^(n-1)`; a rejection is not retried.
    async fn deliver(&self, subject_id: &str, contact: &str, code: &str) -> Result<String, DeliveryError> {
        let max_attempts = self.config.delivery_max_attempts.max(1);
        let mut backoff = self.config.delivery_backoff;
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(
                self.config.delivery_timeout,
                self.notifier.send_code(contact, code),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout),
            };

            let error = match result {
                Ok(message_id) => return Ok(message_id),
                Err(e @ DeliveryError::Rejected { .. }) => return Err(e),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                return Err(error);
            }

            tracing::warn!(
                subject_id = subject_id,
                attempt = attempt,
                retry_in_ms = backoff.as_millis() as u64,
                error = %error,
                event = "otp_delivery_retry",
                "Code delivery failed, retrying"
            );
            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
            attempt += 1;
        }
    }

    fn locked(&self, subject_id: &str, lockout: &Lockout) -> DomainError {
        tracing::warn!(
            subject_id = subject_id,
            locked_until = %lockout.locked_until,
            event = "otp_locked",
            "Attempt limit reached, verification locked"
        );
        ChallengeError::Locked {
            locked_until: lockout.locked_until,
        }
        .into()
    }
}

fn invalid_input(field: &str) -> DomainError {
    ChallengeError::InvalidInput {
        field: field.to_string(),
    }
    .into()
}
