//! Account and OTP slot persistence.
//!
//! All state lives in Postgres; the per-row atomic UPDATE is the only
//! serialization point between concurrent requests for the same account.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

use super::models::{Account, Flow, OtpSlot};

pub struct OtpRepo;

impl OtpRepo {
    /// Look up an account by normalized email.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>> {
        let query = "SELECT * FROM accounts WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, Account>(query)
            .bind(email)
            .fetch_optional(pool)
            .instrument(span)
            .await
            .context("failed to lookup account")
    }

    /// Create a pre-verification stub for an email not yet on file.
    ///
    /// Safe under concurrent issuance: the upsert always returns the row,
    /// whether this call created it or lost the race.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn create_stub(pool: &PgPool, email: &str) -> Result<Account> {
        let query = r"
            INSERT INTO accounts (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING *
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query_as::<_, Account>(query)
            .bind(email)
            .fetch_one(pool)
            .instrument(span)
            .await
            .context("failed to create account stub")
    }

    /// Persist a freshly issued slot, overwriting the previous code for the
    /// flow in one statement.
    ///
    /// # Errors
    /// Returns an error if the database update fails.
    pub async fn store_slot(
        pool: &PgPool,
        account_id: Uuid,
        flow: Flow,
        slot: &OtpSlot,
    ) -> Result<()> {
        let prefix = flow.column_prefix();
        let query = format!(
            r"
            UPDATE accounts
            SET {prefix}_otp_hash = $2,
                {prefix}_otp_expires_at = $3,
                {prefix}_otp_attempts = $4,
                {prefix}_otp_resend_at = $5,
                updated_at = NOW()
            WHERE id = $1
            "
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query.as_str()
        );
        sqlx::query(&query)
            .bind(account_id)
            .bind(slot.code_hash.as_deref())
            .bind(slot.expires_at)
            .bind(slot.attempts)
            .bind(slot.resend_at)
            .execute(pool)
            .instrument(span)
            .await
            .context("failed to store otp slot")?;
        Ok(())
    }

    /// Bump the flow's attempt counter after a mismatched code.
    ///
    /// The increment happens database-side so concurrent wrong submissions
    /// cannot lose counts.
    ///
    /// # Errors
    /// Returns an error if the database update fails.
    pub async fn record_failed_attempt(pool: &PgPool, account_id: Uuid, flow: Flow) -> Result<()> {
        let prefix = flow.column_prefix();
        let query = format!(
            r"
            UPDATE accounts
            SET {prefix}_otp_attempts = {prefix}_otp_attempts + 1,
                updated_at = NOW()
            WHERE id = $1
            "
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query.as_str()
        );
        sqlx::query(&query)
            .bind(account_id)
            .execute(pool)
            .instrument(span)
            .await
            .context("failed to record otp attempt")?;
        Ok(())
    }

    /// Complete signup verification: flip the verification flag, apply the
    /// pending profile fields, and clear the signup slot, atomically.
    ///
    /// # Errors
    /// Returns an error if the database update fails.
    pub async fn complete_signup(
        pool: &PgPool,
        account_id: Uuid,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<()> {
        let query = r"
            UPDATE accounts
            SET verified = TRUE,
                first_name = $2,
                last_name = $3,
                password_hash = $4,
                signup_otp_hash = NULL,
                signup_otp_expires_at = NULL,
                signup_otp_attempts = 0,
                signup_otp_resend_at = NULL,
                updated_at = NOW()
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(account_id)
            .bind(first_name)
            .bind(last_name)
            .bind(password_hash)
            .execute(pool)
            .instrument(span)
            .await
            .context("failed to complete signup")?;
        Ok(())
    }

    /// Complete a password reset: overwrite the password hash and clear the
    /// reset slot, atomically. The signup slot is untouched.
    ///
    /// # Errors
    /// Returns an error if the database update fails.
    pub async fn complete_reset(pool: &PgPool, account_id: Uuid, password_hash: &str) -> Result<()> {
        let query = r"
            UPDATE accounts
            SET password_hash = $2,
                reset_otp_hash = NULL,
                reset_otp_expires_at = NULL,
                reset_otp_attempts = 0,
                reset_otp_resend_at = NULL,
                updated_at = NOW()
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(account_id)
            .bind(password_hash)
            .execute(pool)
            .instrument(span)
            .await
            .context("failed to complete password reset")?;
        Ok(())
    }
}
