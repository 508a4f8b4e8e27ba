//! Mock implementations for testing the challenge engine

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use cg_shared::config::RateLimitConfig;

use crate::domain::entities::{Challenge, Lockout, VerifiedSession};
use crate::errors::{DeliveryError, DomainError, DomainResult};
use crate::repositories::{ChallengeStore, FailedAttempt, InMemoryChallengeStore};
use crate::services::challenge::{ChallengeEngine, ChallengeEngineConfig};
use crate::services::clock::{Clock, ManualClock};
use crate::services::codec::CodeCodec;
use crate::services::notifier::NotifierTrait;
use crate::services::rate_limit::InMemoryRateLimiter;
use crate::services::session_token::{SessionTokenConfig, SessionTokenIssuer};

pub const SECRET: &str = "engine-test-secret-0123456789";

/// How the mock notifier behaves on each call
#[derive(Clone, Copy)]
pub enum NotifierMode {
    Succeed,
    /// Fail with `Unavailable` this many times, then succeed
    FailTimes(u32),
    Reject,
    /// Never complete
    Hang,
}

// Mock notifier capturing the last code per contact
pub struct MockNotifier {
    pub sent_codes: Mutex<HashMap<String, String>>,
    pub calls: AtomicU32,
    mode: NotifierMode,
}

impl MockNotifier {
    pub fn new(mode: NotifierMode) -> Self {
        Self {
            sent_codes: Mutex::new(HashMap::new()),
            calls: AtomicU32::new(0),
            mode,
        }
    }

    pub fn last_code(&self, contact: &str) -> Option<String> {
        self.sent_codes.lock().unwrap().get(contact).cloned()
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotifierTrait for MockNotifier {
    async fn send_code(&self, contact: &str, code: &str) -> Result<String, DeliveryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.mode {
            NotifierMode::Succeed => {}
            NotifierMode::FailTimes(n) if call <= n => {
                return Err(DeliveryError::Unavailable {
                    message: format!("attempt {} failed", call),
                })
            }
            NotifierMode::FailTimes(_) => {}
            NotifierMode::Reject => {
                return Err(DeliveryError::Rejected {
                    message: "unknown recipient".to_string(),
                })
            }
            NotifierMode::Hang => std::future::pending::<()>().await,
        }
        self.sent_codes
            .lock()
            .unwrap()
            .insert(contact.to_string(), code.to_string());
        Ok(format!("mock-msg-{}", call))
    }
}

// Store whose every operation fails, for error propagation tests
pub struct BrokenStore;

fn broken<T>() -> DomainResult<T> {
    Err(DomainError::Storage {
        message: "connection refused".to_string(),
    })
}

#[async_trait]
impl ChallengeStore for BrokenStore {
    async fn get_challenge(&self, _: &str) -> DomainResult<Option<Challenge>> {
        broken()
    }
    async fn upsert_challenge(&self, _: &Challenge) -> DomainResult<()> {
        broken()
    }
    async fn delete_challenge(&self, _: &str) -> DomainResult<()> {
        broken()
    }
    async fn discard_challenge(&self, _: &str, _: &str) -> DomainResult<bool> {
        broken()
    }
    async fn get_lockout(&self, _: &str, _: DateTime<Utc>) -> DomainResult<Option<Lockout>> {
        broken()
    }
    async fn upsert_lockout(&self, _: &Lockout) -> DomainResult<()> {
        broken()
    }
    async fn delete_lockout(&self, _: &str) -> DomainResult<()> {
        broken()
    }
    async fn get_verified_session(&self, _: &str, _: DateTime<Utc>) -> DomainResult<Option<VerifiedSession>> {
        broken()
    }
    async fn upsert_verified_session(&self, _: &VerifiedSession) -> DomainResult<()> {
        broken()
    }
    async fn delete_verified_session(&self, _: &str) -> DomainResult<()> {
        broken()
    }
    async fn record_failed_attempt(&self, _: &str, _: &str, _: u32, _: &Lockout) -> DomainResult<Option<FailedAttempt>> {
        broken()
    }
    async fn escalate_lockout(&self, _: &Lockout) -> DomainResult<()> {
        broken()
    }
    async fn consume_challenge(&self, _: &str, _: &str, _: &VerifiedSession) -> DomainResult<bool> {
        broken()
    }
}

pub type TestEngine<S> = ChallengeEngine<S, InMemoryRateLimiter<ManualClock>, MockNotifier>;

/// Everything a test needs to drive and inspect an engine
pub struct Harness<S: ChallengeStore> {
    pub engine: Arc<TestEngine<S>>,
    pub store: Arc<S>,
    pub notifier: Arc<MockNotifier>,
    pub clock: Arc<ManualClock>,
    pub codec: CodeCodec,
    pub tokens: Arc<SessionTokenIssuer>,
}

pub fn harness(mode: NotifierMode, rate_limits: RateLimitConfig) -> Harness<InMemoryChallengeStore> {
    harness_with_store(Arc::new(InMemoryChallengeStore::new()), mode, rate_limits)
}

pub fn harness_with_store<S: ChallengeStore>(
    store: Arc<S>,
    mode: NotifierMode,
    rate_limits: RateLimitConfig,
) -> Harness<S> {
    let clock = Arc::new(ManualClock::starting_now());
    let notifier = Arc::new(MockNotifier::new(mode));
    let codec = CodeCodec::new(SECRET).unwrap();
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let tokens = Arc::new(SessionTokenIssuer::new(SessionTokenConfig::new(SECRET), dyn_clock.clone()).unwrap());
    let limiter = Arc::new(InMemoryRateLimiter::new(clock.clone()));

    let engine = Arc::new(ChallengeEngine::new(
        store.clone(),
        limiter,
        notifier.clone(),
        codec.clone(),
        tokens.clone(),
        dyn_clock,
        ChallengeEngineConfig::default(),
        rate_limits,
    ));

    Harness {
        engine,
        store,
        notifier,
        clock,
        codec,
        tokens,
    }
}

/// A code that is not `code`
pub fn wrong_code(code: &str) -> String {
    if code == "000000" {
        "000001".to_string()
    } else {
        "000000".to_string()
    }
}
