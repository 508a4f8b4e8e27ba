//! Unit tests for the session token issuer

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::domain::entities::SessionClaims;
use crate::errors::{DomainError, TokenError};
use crate::services::clock::{Clock, ManualClock};
use crate::services::session_token::{SessionTokenConfig, SessionTokenIssuer};

const SECRET: &str = "session-secret-0123456789";

fn issuer_with_clock() -> (SessionTokenIssuer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let issuer = SessionTokenIssuer::new(SessionTokenConfig::new(SECRET), clock.clone()).unwrap();
    (issuer, clock)
}

#[test]
fn test_empty_secret_is_rejected() {
    let clock = Arc::new(ManualClock::starting_now());
    let result = SessionTokenIssuer::new(SessionTokenConfig::new(""), clock);
    assert!(matches!(result, Err(DomainError::Config { .. })));
}

#[test]
fn test_issue_and_validate() {
    let (issuer, clock) = issuer_with_clock();

    let (token, expires_at) = issuer.issue("c1", "+15551230000").unwrap();
    assert_eq!(expires_at, clock.now() + Duration::minutes(30));

    let claims = issuer.validate(&token).unwrap();
    assert_eq!(claims.sub, "c1");
    assert_eq!(claims.phone, "+15551230000");
    assert_eq!(claims.iss, "checkout-gate");
    assert_eq!(claims.exp, expires_at.timestamp());
}

#[test]
fn test_expired_token_is_invalid() {
    let (issuer, clock) = issuer_with_clock();
    let (token, _) = issuer.issue("c1", "+15551230000").unwrap();

    clock.advance(Duration::minutes(29));
    assert!(issuer.validate(&token).is_ok());

    clock.advance(Duration::minutes(1));
    assert_eq!(issuer.validate(&token), Err(TokenError::InvalidToken));
}

#[test]
fn test_tampered_token_is_invalid() {
    let (issuer, _) = issuer_with_clock();
    let (token, _) = issuer.issue("c1", "+15551230000").unwrap();

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    assert_eq!(issuer.validate(&tampered), Err(TokenError::InvalidToken));
    assert_eq!(issuer.validate("not.a.token"), Err(TokenError::InvalidToken));
    assert_eq!(issuer.validate(""), Err(TokenError::InvalidToken));
}

#[test]
fn test_token_signed_with_other_secret_is_invalid() {
    let (issuer, clock) = issuer_with_clock();
    let other = SessionTokenIssuer::new(
        SessionTokenConfig::new("a-completely-different-secret"),
        clock,
    )
    .unwrap();

    let (token, _) = other.issue("c1", "+15551230000").unwrap();
    assert_eq!(issuer.validate(&token), Err(TokenError::InvalidToken));
}

#[test]
fn test_wrong_issuer_is_invalid() {
    let (issuer, _) = issuer_with_clock();
    let now = Utc::now();
    let claims = SessionClaims::new("c1", "+15551230000", "someone-else", now, now + Duration::minutes(30));
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(issuer.validate(&token), Err(TokenError::InvalidToken));
}

#[test]
fn test_issue_at_uses_given_instants() {
    let (issuer, clock) = issuer_with_clock();
    let issued_at = clock.now();
    let expires_at = issued_at + Duration::minutes(5);

    let token = issuer.issue_at("c1", "+15551230000", issued_at, expires_at).unwrap();
    let claims = issuer.validate(&token).unwrap();
    assert_eq!(claims.iat, issued_at.timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
}
