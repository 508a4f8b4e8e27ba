//! Process-local challenge store for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{Challenge, Lockout, VerifiedSession};
use crate::errors::DomainResult;

use super::r#trait::{ChallengeStore, FailedAttempt};

#[derive(Default)]
struct State {
    challenges: HashMap<String, Challenge>,
    lockouts: HashMap<String, Lockout>,
    sessions: HashMap<String, VerifiedSession>,
}

/// In-memory `ChallengeStore`
///
/// All three tables sit behind one lock, so every compound transition is
/// atomic. Not shared across processes.
#[derive(Clone, Default)]
pub struct InMemoryChallengeStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryChallengeStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn get_challenge(&self, subject_id: &str) -> DomainResult<Option<Challenge>> {
        Ok(self.state.read().await.challenges.get(subject_id).cloned())
    }

    async fn upsert_challenge(&self, challenge: &Challenge) -> DomainResult<()> {
        self.state
            .write()
            .await
            .challenges
            .insert(challenge.subject_id.clone(), challenge.clone());
        Ok(())
    }

    async fn delete_challenge(&self, subject_id: &str) -> DomainResult<()> {
        self.state.write().await.challenges.remove(subject_id);
        Ok(())
    }

    async fn discard_challenge(&self, subject_id: &str, code_digest: &str) -> DomainResult<bool> {
        let mut state = self.state.write().await;
        match state.challenges.get(subject_id) {
            Some(challenge) if challenge.code_digest == code_digest => {
                state.challenges.remove(subject_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_lockout(&self, subject_id: &str, now: DateTime<Utc>) -> DomainResult<Option<Lockout>> {
        let state = self.state.read().await;
        Ok(state
            .lockouts
            .get(subject_id)
            .filter(|l| l.is_active(now))
            .cloned())
    }

    async fn upsert_lockout(&self, lockout: &Lockout) -> DomainResult<()> {
        self.state
            .write()
            .await
            .lockouts
            .insert(lockout.subject_id.clone(), lockout.clone());
        Ok(())
    }

    async fn delete_lockout(&self, subject_id: &str) -> DomainResult<()> {
        self.state.write().await.lockouts.remove(subject_id);
        Ok(())
    }

    async fn get_verified_session(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<VerifiedSession>> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(subject_id)
            .filter(|s| s.is_live(now))
            .cloned())
    }

    async fn upsert_verified_session(&self, session: &VerifiedSession) -> DomainResult<()> {
        self.state
            .write()
            .await
            .sessions
            .insert(session.subject_id.clone(), session.clone());
        Ok(())
    }

    async fn delete_verified_session(&self, subject_id: &str) -> DomainResult<()> {
        self.state.write().await.sessions.remove(subject_id);
        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        subject_id: &str,
        code_digest: &str,
        attempt_limit: u32,
        lockout: &Lockout,
    ) -> DomainResult<Option<FailedAttempt>> {
        let mut state = self.state.write().await;

        let attempts = match state.challenges.get_mut(subject_id) {
            Some(challenge) if challenge.code_digest == code_digest => {
                challenge.attempts += 1;
                challenge.attempts
            }
            _ => return Ok(None),
        };

        let locked = attempts >= attempt_limit;
        if locked {
            state.challenges.remove(subject_id);
            state.lockouts.insert(subject_id.to_string(), lockout.clone());
        }

        Ok(Some(FailedAttempt { attempts, locked }))
    }

    async fn escalate_lockout(&self, lockout: &Lockout) -> DomainResult<()> {
        let mut state = self.state.write().await;
        state.challenges.remove(&lockout.subject_id);
        state.lockouts.insert(lockout.subject_id.clone(), lockout.clone());
        Ok(())
    }

    async fn consume_challenge(
        &self,
        subject_id: &str,
        code_digest: &str,
        session: &VerifiedSession,
    ) -> DomainResult<bool> {
        let mut state = self.state.write().await;

        let present = state
            .challenges
            .get(subject_id)
            .map(|c| c.code_digest == code_digest)
            .unwrap_or(false);
        if !present {
            return Ok(false);
        }

        state.challenges.remove(subject_id);
        state.sessions.insert(subject_id.to_string(), session.clone());
        Ok(true)
    }
}
