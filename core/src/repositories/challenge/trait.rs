//! Challenge store trait: durable challenges, lockouts and verified sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Challenge, Lockout, VerifiedSession};
use crate::errors::DomainResult;

/// Result of recording one failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedAttempt {
    /// Attempt count after the increment
    pub attempts: u32,

    /// The limit was reached; the challenge is gone and the lockout stored
    pub locked: bool,
}

/// Store for everything the challenge engine persists, keyed by subject id
///
/// Plain reads and writes are single-row upserts. The compound transitions
/// (`record_failed_attempt`, `escalate_lockout`, `consume_challenge`) must be
/// atomic per subject: implementations run them in one transaction, one
/// script, or under one lock.
///
/// Time-filtered reads take `now` so that expiry is decided by the caller's
/// clock, not the storage server's.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Current challenge for the subject, live or not
    async fn get_challenge(&self, subject_id: &str) -> DomainResult<Option<Challenge>>;

    /// Insert or replace the subject's challenge
    async fn upsert_challenge(&self, challenge: &Challenge) -> DomainResult<()>;

    async fn delete_challenge(&self, subject_id: &str) -> DomainResult<()>;

    /// Delete the challenge only while its digest is still `code_digest`
    ///
    /// Returns `false` when the challenge is gone or was replaced.
    async fn discard_challenge(&self, subject_id: &str, code_digest: &str) -> DomainResult<bool>;

    /// Lockout with `locked_until > now`
    async fn get_lockout(&self, subject_id: &str, now: DateTime<Utc>) -> DomainResult<Option<Lockout>>;

    async fn upsert_lockout(&self, lockout: &Lockout) -> DomainResult<()>;

    async fn delete_lockout(&self, subject_id: &str) -> DomainResult<()>;

    /// Verified session with `expires_at > now`
    async fn get_verified_session(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<VerifiedSession>>;

    async fn upsert_verified_session(&self, session: &VerifiedSession) -> DomainResult<()>;

    async fn delete_verified_session(&self, subject_id: &str) -> DomainResult<()>;

    /// Increment the attempt counter of the challenge whose digest is `code_digest`
    ///
    /// When the new count reaches `attempt_limit` the challenge is deleted
    /// and `lockout` upserted in the same unit. Returns `None` when that
    /// challenge no longer exists (consumed or replaced concurrently).
    async fn record_failed_attempt(
        &self,
        subject_id: &str,
        code_digest: &str,
        attempt_limit: u32,
        lockout: &Lockout,
    ) -> DomainResult<Option<FailedAttempt>>;

    /// Delete the challenge and upsert the lockout as one unit
    async fn escalate_lockout(&self, lockout: &Lockout) -> DomainResult<()>;

    /// Delete the challenge whose digest is `code_digest` and store `session`
    ///
    /// Returns `false`, storing nothing, when that challenge is already gone;
    /// of two concurrent consumers exactly one sees `true`.
    async fn consume_challenge(
        &self,
        subject_id: &str,
        code_digest: &str,
        session: &VerifiedSession,
    ) -> DomainResult<bool>;
}
