//! MySQL implementation of the ChallengeStore trait.
//!
//! Challenges, lockouts and verified sessions live in three tables keyed by
//! subject id. Compound transitions lock the challenge row with
//! `SELECT ... FOR UPDATE` inside a transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Row, Transaction};

use cg_core::domain::entities::{Challenge, Lockout, VerifiedSession};
use cg_core::errors::{DomainError, DomainResult};
use cg_core::repositories::{ChallengeStore, FailedAttempt};

/// MySQL implementation of ChallengeStore
pub struct MySqlChallengeStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlChallengeStore {
    /// Create a new MySQL challenge store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Challenge entity
    fn row_to_challenge(row: &sqlx::mysql::MySqlRow) -> DomainResult<Challenge> {
        Ok(Challenge {
            subject_id: row.try_get("subject_id").map_err(column("subject_id"))?,
            contact: row.try_get("contact").map_err(column("contact"))?,
            code_digest: row.try_get("code_digest").map_err(column("code_digest"))?,
            attempts: row.try_get("attempts").map_err(column("attempts"))?,
            created_at: row.try_get("created_at").map_err(column("created_at"))?,
            expires_at: row.try_get("expires_at").map_err(column("expires_at"))?,
            resend_eligible_at: row
                .try_get("resend_eligible_at")
                .map_err(column("resend_eligible_at"))?,
            request_origin: row.try_get("request_origin").map_err(column("request_origin"))?,
        })
    }

    async fn begin(&self) -> DomainResult<Transaction<'_, MySql>> {
        self.pool.begin().await.map_err(failed("begin transaction"))
    }

    /// Lock the challenge row and return its attempts if the digest still matches
    async fn lock_challenge(
        tx: &mut Transaction<'_, MySql>,
        subject_id: &str,
        code_digest: &str,
    ) -> DomainResult<Option<u32>> {
        let row = sqlx::query(
            "SELECT attempts, code_digest FROM otp_challenges WHERE subject_id = ? FOR UPDATE",
        )
        .bind(subject_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(failed("lock challenge"))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let stored_digest: String = row.try_get("code_digest").map_err(column("code_digest"))?;
        if stored_digest != code_digest {
            return Ok(None);
        }

        Ok(Some(row.try_get("attempts").map_err(column("attempts"))?))
    }

    async fn delete_challenge_in(tx: &mut Transaction<'_, MySql>, subject_id: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM otp_challenges WHERE subject_id = ?")
            .bind(subject_id)
            .execute(&mut **tx)
            .await
            .map_err(failed("delete challenge"))?;
        Ok(())
    }

    async fn upsert_lockout_in(tx: &mut Transaction<'_, MySql>, lockout: &Lockout) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO otp_lockouts (subject_id, locked_until)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE locked_until = VALUES(locked_until)
            "#,
        )
        .bind(&lockout.subject_id)
        .bind(lockout.locked_until)
        .execute(&mut **tx)
        .await
        .map_err(failed("save lockout"))?;
        Ok(())
    }
}

#[async_trait]
impl ChallengeStore for MySqlChallengeStore {
    async fn get_challenge(&self, subject_id: &str) -> DomainResult<Option<Challenge>> {
        let query = r#"
            SELECT subject_id, contact, code_digest, attempts, created_at,
                   expires_at, resend_eligible_at, request_origin
            FROM otp_challenges
            WHERE subject_id = ?
        "#;

        let row = sqlx::query(query)
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(failed("find challenge"))?;

        row.as_ref().map(Self::row_to_challenge).transpose()
    }

    async fn upsert_challenge(&self, challenge: &Challenge) -> DomainResult<()> {
        let query = r#"
            INSERT INTO otp_challenges (
                subject_id, contact, code_digest, attempts, created_at,
                expires_at, resend_eligible_at, request_origin
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                contact = VALUES(contact),
                code_digest = VALUES(code_digest),
                attempts = VALUES(attempts),
                created_at = VALUES(created_at),
                expires_at = VALUES(expires_at),
                resend_eligible_at = VALUES(resend_eligible_at),
                request_origin = VALUES(request_origin)
        "#;

        sqlx::query(query)
            .bind(&challenge.subject_id)
            .bind(&challenge.contact)
            .bind(&challenge.code_digest)
            .bind(challenge.attempts)
            .bind(challenge.created_at)
            .bind(challenge.expires_at)
            .bind(challenge.resend_eligible_at)
            .bind(&challenge.request_origin)
            .execute(&self.pool)
            .await
            .map_err(failed("save challenge"))?;

        Ok(())
    }

    async fn delete_challenge(&self, subject_id: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM otp_challenges WHERE subject_id = ?")
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(failed("delete challenge"))?;
        Ok(())
    }

    async fn discard_challenge(&self, subject_id: &str, code_digest: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE subject_id = ? AND code_digest = ?")
            .bind(subject_id)
            .bind(code_digest)
            .execute(&self.pool)
            .await
            .map_err(failed("discard challenge"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_lockout(&self, subject_id: &str, now: DateTime<Utc>) -> DomainResult<Option<Lockout>> {
        let row = sqlx::query(
            "SELECT subject_id, locked_until FROM otp_lockouts WHERE subject_id = ? AND locked_until > ?",
        )
        .bind(subject_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(failed("find lockout"))?;

        match row {
            Some(row) => Ok(Some(Lockout {
                subject_id: row.try_get("subject_id").map_err(column("subject_id"))?,
                locked_until: row.try_get("locked_until").map_err(column("locked_until"))?,
            })),
            None => Ok(None),
        }
    }

    async fn upsert_lockout(&self, lockout: &Lockout) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        Self::upsert_lockout_in(&mut tx, lockout).await?;
        tx.commit().await.map_err(failed("commit lockout"))
    }

    async fn delete_lockout(&self, subject_id: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM otp_lockouts WHERE subject_id = ?")
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(failed("delete lockout"))?;
        Ok(())
    }

    async fn get_verified_session(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<VerifiedSession>> {
        let query = r#"
            SELECT subject_id, contact, verified_at, expires_at
            FROM otp_verified_sessions
            WHERE subject_id = ? AND expires_at > ?
        "#;

        let row = sqlx::query(query)
            .bind(subject_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(failed("find verified session"))?;

        match row {
            Some(row) => Ok(Some(VerifiedSession {
                subject_id: row.try_get("subject_id").map_err(column("subject_id"))?,
                contact: row.try_get("contact").map_err(column("contact"))?,
                verified_at: row.try_get("verified_at").map_err(column("verified_at"))?,
                expires_at: row.try_get("expires_at").map_err(column("expires_at"))?,
            })),
            None => Ok(None),
        }
    }

    async fn upsert_verified_session(&self, session: &VerifiedSession) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        upsert_session_in(&mut tx, session).await?;
        tx.commit().await.map_err(failed("commit verified session"))
    }

    async fn delete_verified_session(&self, subject_id: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM otp_verified_sessions WHERE subject_id = ?")
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(failed("delete verified session"))?;
        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        subject_id: &str,
        code_digest: &str,
        attempt_limit: u32,
        lockout: &Lockout,
    ) -> DomainResult<Option<FailedAttempt>> {
        let mut tx = self.begin().await?;

        let attempts = match Self::lock_challenge(&mut tx, subject_id, code_digest).await? {
            Some(current) => current.saturating_add(1),
            None => {
                tx.rollback().await.map_err(failed("rollback"))?;
                return Ok(None);
            }
        };

        let locked = attempts >= attempt_limit;
        if locked {
            Self::delete_challenge_in(&mut tx, subject_id).await?;
            Self::upsert_lockout_in(&mut tx, lockout).await?;
        } else {
            sqlx::query("UPDATE otp_challenges SET attempts = ? WHERE subject_id = ?")
                .bind(attempts)
                .bind(subject_id)
                .execute(&mut *tx)
                .await
                .map_err(failed("increment attempts"))?;
        }

        tx.commit().await.map_err(failed("commit failed attempt"))?;
        Ok(Some(FailedAttempt { attempts, locked }))
    }

    async fn escalate_lockout(&self, lockout: &Lockout) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        Self::delete_challenge_in(&mut tx, &lockout.subject_id).await?;
        Self::upsert_lockout_in(&mut tx, lockout).await?;
        tx.commit().await.map_err(failed("commit lockout"))
    }

    async fn consume_challenge(
        &self,
        subject_id: &str,
        code_digest: &str,
        session: &VerifiedSession,
    ) -> DomainResult<bool> {
        let mut tx = self.begin().await?;

        if Self::lock_challenge(&mut tx, subject_id, code_digest).await?.is_none() {
            tx.rollback().await.map_err(failed("rollback"))?;
            return Ok(false);
        }

        Self::delete_challenge_in(&mut tx, subject_id).await?;
        upsert_session_in(&mut tx, session).await?;

        tx.commit().await.map_err(failed("commit verification"))?;
        Ok(true)
    }
}

async fn upsert_session_in(tx: &mut Transaction<'_, MySql>, session: &VerifiedSession) -> DomainResult<()> {
    let query = r#"
        INSERT INTO otp_verified_sessions (subject_id, contact, verified_at, expires_at)
        VALUES (?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            contact = VALUES(contact),
            verified_at = VALUES(verified_at),
            expires_at = VALUES(expires_at)
    "#;

    sqlx::query(query)
        .bind(&session.subject_id)
        .bind(&session.contact)
        .bind(session.verified_at)
        .bind(session.expires_at)
        .execute(&mut **tx)
        .await
        .map_err(failed("save verified session"))?;
    Ok(())
}

fn failed(operation: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::Storage {
        message: format!("Failed to {}: {}", operation, e),
    }
}

fn column(name: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::Storage {
        message: format!("Failed to read column {}: {}", name, e),
    }
}
