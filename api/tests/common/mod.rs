//! Shared fixtures for the HTTP tests: in-memory backends, a notifier that
//! keeps delivered codes and a resolver with a scripted answer.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;

use cg_api::{AppState, CookieSettings, Engine, Gate};
use cg_core::errors::{DeliveryError, ResolveError};
use cg_core::services::{
    ChallengeEngine, ChallengeEngineConfig, CheckoutGate, Clock, CodeCodec, ManualClock, NotifierTrait,
    SessionTokenConfig, SessionTokenIssuer, SubjectAttributeResolver,
};
use cg_infra::Backends;
use cg_shared::config::RateLimitConfig;

pub const SECRET: &str = "api-test-secret-0123456789";
pub const PHONE: &str = "+15551230000";
pub const CHECKOUT_URL: &str = "https://shop.example.com/checkouts/c1";

/// Notifier that remembers the last code sent to each contact
#[derive(Default)]
pub struct Inbox {
    codes: Mutex<HashMap<String, String>>,
}

impl Inbox {
    pub fn code_for(&self, contact: &str) -> String {
        self.codes
            .lock()
            .unwrap()
            .get(contact)
            .cloned()
            .expect("no code delivered")
    }
}

#[async_trait]
impl NotifierTrait for Inbox {
    async fn send_code(&self, contact: &str, code: &str) -> Result<String, DeliveryError> {
        self.codes
            .lock()
            .unwrap()
            .insert(contact.to_string(), code.to_string());
        Ok("test-msg".to_string())
    }
}

/// Resolver answering every cart with the same result
pub struct StaticResolver {
    pub result: Result<String, ResolveError>,
}

#[async_trait]
impl SubjectAttributeResolver for StaticResolver {
    async fn resolve(&self, _subject_id: &str) -> Result<String, ResolveError> {
        self.result.clone()
    }
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub inbox: Arc<Inbox>,
    pub clock: Arc<ManualClock>,
}

pub fn context() -> TestContext {
    context_with_resolver(Ok(CHECKOUT_URL.to_string()))
}

pub fn context_with_resolver(result: Result<String, ResolveError>) -> TestContext {
    let clock = Arc::new(ManualClock::starting_now());
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let backends = Backends::in_memory(dyn_clock.clone());
    let inbox = Arc::new(Inbox::default());
    let tokens = Arc::new(
        SessionTokenIssuer::new(SessionTokenConfig::new(SECRET), dyn_clock.clone()).unwrap(),
    );

    let notifier: Arc<dyn NotifierTrait> = inbox.clone();
    let engine: Arc<Engine> = Arc::new(ChallengeEngine::new(
        backends.store.clone(),
        backends.rate_limiter.clone(),
        notifier,
        CodeCodec::new(SECRET).unwrap(),
        tokens.clone(),
        dyn_clock.clone(),
        ChallengeEngineConfig::default(),
        RateLimitConfig::default(),
    ));

    let resolver: Arc<dyn SubjectAttributeResolver> = Arc::new(StaticResolver { result });
    let gate: Arc<Gate> = Arc::new(CheckoutGate::new(
        backends.store.clone(),
        resolver,
        tokens,
        dyn_clock,
    ));

    let state = web::Data::new(AppState::new(
        engine,
        gate,
        backends,
        CookieSettings {
            name: "otp_token".to_string(),
            secure: false,
        },
        16 * 1024,
    ));

    TestContext { state, inbox, clock }
}

/// A 6-digit code guaranteed to differ from `code`
pub fn other_code(code: &str) -> String {
    if code == "111111" {
        "222222".to_string()
    } else {
        "111111".to_string()
    }
}
