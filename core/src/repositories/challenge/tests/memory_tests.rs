//! Unit tests for the in-memory challenge store

use chrono::{Duration, Utc};

use crate::domain::entities::{Challenge, Lockout, VerifiedSession};
use crate::repositories::challenge::{ChallengeStore, FailedAttempt, InMemoryChallengeStore};

fn challenge(subject_id: &str, digest: &str) -> Challenge {
    Challenge::issue(
        subject_id,
        "+15551230000",
        digest,
        "127.0.0.1",
        Utc::now(),
        Duration::seconds(300),
        Duration::seconds(45),
    )
}

#[tokio::test]
async fn test_upsert_replaces_challenge() {
    let store = InMemoryChallengeStore::new();

    store.upsert_challenge(&challenge("c1", "aa")).await.unwrap();
    store.upsert_challenge(&challenge("c1", "bb")).await.unwrap();

    let stored = store.get_challenge("c1").await.unwrap().unwrap();
    assert_eq!(stored.code_digest, "bb");
}

#[tokio::test]
async fn test_discard_requires_matching_digest() {
    let store = InMemoryChallengeStore::new();
    store.upsert_challenge(&challenge("c1", "aa")).await.unwrap();
    store.upsert_challenge(&challenge("c1", "bb")).await.unwrap();

    assert!(!store.discard_challenge("c1", "aa").await.unwrap());
    assert_eq!(store.get_challenge("c1").await.unwrap().unwrap().code_digest, "bb");

    assert!(store.discard_challenge("c1", "bb").await.unwrap());
    assert!(store.get_challenge("c1").await.unwrap().is_none());
    assert!(!store.discard_challenge("c1", "bb").await.unwrap());
}

#[tokio::test]
async fn test_lockout_read_is_time_filtered() {
    let store = InMemoryChallengeStore::new();
    let now = Utc::now();
    let lockout = Lockout::starting_at("c1", now, Duration::minutes(15));
    store.upsert_lockout(&lockout).await.unwrap();

    assert!(store.get_lockout("c1", now).await.unwrap().is_some());
    assert!(store
        .get_lockout("c1", now + Duration::minutes(15))
        .await
        .unwrap()
        .is_none());

    store.delete_lockout("c1").await.unwrap();
    assert!(store.get_lockout("c1", now).await.unwrap().is_none());
}

#[tokio::test]
async fn test_verified_session_read_is_time_filtered() {
    let store = InMemoryChallengeStore::new();
    let now = Utc::now();
    let session = VerifiedSession::verified_at("c1", "+15551230000", now, Duration::minutes(30));
    store.upsert_verified_session(&session).await.unwrap();

    assert_eq!(store.get_verified_session("c1", now).await.unwrap(), Some(session));
    assert!(store
        .get_verified_session("c1", now + Duration::minutes(31))
        .await
        .unwrap()
        .is_none());

    store.delete_verified_session("c1").await.unwrap();
    assert!(store.get_verified_session("c1", now).await.unwrap().is_none());
}

#[tokio::test]
async fn test_record_failed_attempt_locks_at_limit() {
    let store = InMemoryChallengeStore::new();
    let now = Utc::now();
    let lockout = Lockout::starting_at("c1", now, Duration::minutes(15));
    store.upsert_challenge(&challenge("c1", "aa")).await.unwrap();

    let first = store.record_failed_attempt("c1", "aa", 2, &lockout).await.unwrap();
    assert_eq!(first, Some(FailedAttempt { attempts: 1, locked: false }));

    let second = store.record_failed_attempt("c1", "aa", 2, &lockout).await.unwrap();
    assert_eq!(second, Some(FailedAttempt { attempts: 2, locked: true }));

    assert!(store.get_challenge("c1").await.unwrap().is_none());
    assert_eq!(store.get_lockout("c1", now).await.unwrap(), Some(lockout));
}

#[tokio::test]
async fn test_record_failed_attempt_ignores_replaced_challenge() {
    let store = InMemoryChallengeStore::new();
    let lockout = Lockout::starting_at("c1", Utc::now(), Duration::minutes(15));
    store.upsert_challenge(&challenge("c1", "new")).await.unwrap();

    let result = store.record_failed_attempt("c1", "old", 5, &lockout).await.unwrap();
    assert_eq!(result, None);
    assert_eq!(store.get_challenge("c1").await.unwrap().unwrap().attempts, 0);
}

#[tokio::test]
async fn test_consume_challenge_only_once() {
    let store = InMemoryChallengeStore::new();
    let now = Utc::now();
    let session = VerifiedSession::verified_at("c1", "+15551230000", now, Duration::minutes(30));
    store.upsert_challenge(&challenge("c1", "aa")).await.unwrap();

    assert!(store.consume_challenge("c1", "aa", &session).await.unwrap());
    assert!(!store.consume_challenge("c1", "aa", &session).await.unwrap());

    assert!(store.get_challenge("c1").await.unwrap().is_none());
    assert!(store.get_verified_session("c1", now).await.unwrap().is_some());
}

#[tokio::test]
async fn test_escalate_lockout_removes_challenge() {
    let store = InMemoryChallengeStore::new();
    let now = Utc::now();
    store.upsert_challenge(&challenge("c1", "aa")).await.unwrap();

    store
        .escalate_lockout(&Lockout::starting_at("c1", now, Duration::minutes(15)))
        .await
        .unwrap();

    assert!(store.get_challenge("c1").await.unwrap().is_none());
    assert!(store.get_lockout("c1", now).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failed_attempts_lock_exactly_once() {
    let store = std::sync::Arc::new(InMemoryChallengeStore::new());
    let lockout = Lockout::starting_at("c1", Utc::now(), Duration::minutes(15));
    let mut seeded = challenge("c1", "aa");
    seeded.attempts = 4;
    store.upsert_challenge(&seeded).await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let lockout = lockout.clone();
            tokio::spawn(async move { store.record_failed_attempt("c1", "aa", 5, &lockout).await.unwrap() })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let recorded: Vec<FailedAttempt> = results.into_iter().flatten().collect();
    assert_eq!(recorded, vec![FailedAttempt { attempts: 5, locked: true }]);
    assert!(store.get_challenge("c1").await.unwrap().is_none());
}
