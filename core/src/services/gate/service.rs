use std::sync::Arc;

use cg_shared::utils::mask_phone_number;

use crate::errors::{AccessError, DomainResult, TokenError};
use crate::repositories::ChallengeStore;
use crate::services::clock::Clock;
use crate::services::session_token::SessionTokenIssuer;

use super::resolver::SubjectAttributeResolver;

/// Downstream consumer of verified sessions
pub struct CheckoutGate<S, A>
where
    S: ChallengeStore + ?Sized,
    A: SubjectAttributeResolver + ?Sized,
{
    store: Arc<S>,
    resolver: Arc<A>,
    tokens: Arc<SessionTokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl<S, A> CheckoutGate<S, A>
where
    S: ChallengeStore + ?Sized,
    A: SubjectAttributeResolver + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        resolver: Arc<A>,
        tokens: Arc<SessionTokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            resolver,
            tokens,
            clock,
        }
    }

    /// Return the checkout URL for `subject_id` if `token` proves verification
    ///
    /// The token alone is not enough: the subject must also still have a live
    /// verified session in the store.
    pub async fn authorize(&self, subject_id: &str, token: Option<&str>) -> DomainResult<String> {
        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => return Err(AccessError::NotVerified.into()),
        };

        let claims = self.tokens.validate(token)?;
        if claims.sub != subject_id {
            tracing::warn!(
                subject_id = subject_id,
                token_subject = %claims.sub,
                event = "checkout_subject_mismatch",
                "Session token issued for a different subject"
            );
            return Err(TokenError::InvalidToken.into());
        }

        let now = self.clock.now();
        if self.store.get_verified_session(subject_id, now).await?.is_none() {
            return Err(AccessError::NotVerified.into());
        }

        let url = match self.resolver.resolve(subject_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(
                    subject_id = subject_id,
                    error = %e,
                    event = "checkout_resolve_failed",
                    "Could not resolve checkout URL"
                );
                return Err(AccessError::ResolveFailed(e).into());
            }
        };

        tracing::info!(
            subject_id = subject_id,
            phone = %mask_phone_number(&claims.phone),
            event = "checkout_released",
            "Checkout URL released"
        );

        Ok(url)
    }
}
