//! The OTP lifecycle manager.
//!
//! Issues, validates, and retires time-limited numeric codes for the signup
//! and reset flows. All decisions come from [`policy`]; this service loads
//! state, persists outcomes, and invokes the mailer.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::crypto::generate_code;
use super::mailer::OtpMailer;
use super::models::{Account, Flow, OtpError};
use super::policy;
use super::repo::OtpRepo;

/// Pending profile fields applied when signup verification succeeds.
#[derive(Debug, Clone)]
pub struct SignupProfile {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Clone)]
pub struct OtpService {
    pool: PgPool,
    mailer: Arc<dyn OtpMailer>,
}

impl OtpService {
    #[must_use]
    pub fn new(pool: PgPool, mailer: Arc<dyn OtpMailer>) -> Self {
        Self { pool, mailer }
    }

    /// Issue a code for the given flow and hand it to the mailer.
    ///
    /// For signup, a stub account is created for an unknown email and an
    /// already-verified account is rejected. For reset, the account must
    /// exist. Re-issuing inside the cooldown window fails with
    /// `TooManyRequests`; otherwise the new code overwrites the previous one
    /// and resets the attempt counter.
    ///
    /// # Errors
    /// Returns the distinguishing [`OtpError`] kind; delivery failure is not
    /// one of them (logged only, the stored code stays valid).
    pub async fn issue(&self, email: &str, flow: Flow) -> Result<(), OtpError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(OtpError::InvalidInput("Email required"));
        }

        let account = OtpRepo::find_by_email(&self.pool, &email).await?;
        let account = match flow {
            Flow::Signup => {
                if account.as_ref().is_some_and(|account| account.verified) {
                    return Err(OtpError::AlreadyVerified);
                }
                match account {
                    Some(account) => account,
                    None => OtpRepo::create_stub(&self.pool, &email).await?,
                }
            }
            Flow::Reset => account.ok_or(OtpError::AccountNotFound)?,
        };

        let now = Utc::now();
        policy::check_cooldown(account.slot(flow), flow, now)?;

        let code = generate_code();
        let slot = policy::fresh_slot(flow, &code, now);
        OtpRepo::store_slot(&self.pool, account.id, flow, &slot).await?;

        info!(email = %email, flow = ?flow, "otp issued");

        // Fire and forget: the persisted code is not rolled back on delivery
        // failure, a later issuance is the recovery path.
        if let Err(err) = self.mailer.send(&email, &code, flow.purpose()) {
            error!(email = %email, flow = ?flow, "otp delivery failed: {err}");
        }

        Ok(())
    }

    /// Validate a signup code and, on the matching attempt, mark the account
    /// verified, apply the pending profile fields, and clear the slot.
    ///
    /// Returns the account id so the caller can issue a session.
    ///
    /// # Errors
    /// Returns the distinguishing [`OtpError`] kind; a mismatch increments
    /// the attempt counter before reporting `InvalidCode`.
    pub async fn verify_signup(
        &self,
        email: &str,
        code: &str,
        profile: SignupProfile,
    ) -> Result<Uuid, OtpError> {
        let account = self.validate_submission(email, Flow::Signup, code).await?;

        let password_hash = hash_password(&profile.password)?;
        OtpRepo::complete_signup(
            &self.pool,
            account.id,
            &profile.first_name,
            &profile.last_name,
            &password_hash,
        )
        .await?;

        info!(account_id = %account.id, "signup verified");
        Ok(account.id)
    }

    /// Validate a reset code and, on the matching attempt, overwrite the
    /// password hash and clear the slot. The signup slot is untouched.
    ///
    /// # Errors
    /// Returns the distinguishing [`OtpError`] kind; a mismatch increments
    /// the attempt counter before reporting `InvalidCode`.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), OtpError> {
        let account = self.validate_submission(email, Flow::Reset, code).await?;

        let password_hash = hash_password(new_password)?;
        OtpRepo::complete_reset(&self.pool, account.id, &password_hash).await?;

        info!(account_id = %account.id, "password reset");
        Ok(())
    }

    /// Shared load-and-validate step for both consume operations.
    ///
    /// A mismatched code bumps the flow's attempt counter database-side
    /// before the failure is reported; every other failure leaves the slot
    /// untouched.
    async fn validate_submission(
        &self,
        email: &str,
        flow: Flow,
        code: &str,
    ) -> Result<Account, OtpError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(OtpError::InvalidInput("Email required"));
        }
        if code.trim().is_empty() {
            return Err(OtpError::InvalidInput("Code required"));
        }

        let account = OtpRepo::find_by_email(&self.pool, &email)
            .await?
            .ok_or(OtpError::NotFound)?;

        match policy::validate(account.slot(flow), flow, code.trim(), Utc::now()) {
            Ok(()) => Ok(account),
            Err(OtpError::InvalidCode) => {
                OtpRepo::record_failed_attempt(&self.pool, account.id, flow).await?;
                Err(OtpError::InvalidCode)
            }
            Err(err) => Err(err),
        }
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, OtpError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| OtpError::Internal(anyhow!("failed to hash password: {err}")))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::mailer::LogOtpMailer;
    use anyhow::Result;
    use argon2::{password_hash::PasswordHash, PasswordVerifier};
    use sqlx::postgres::PgPoolOptions;

    fn service() -> Result<OtpService> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        Ok(OtpService::new(pool, Arc::new(LogOtpMailer)))
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn hash_password_verifies_and_salts() -> Result<()> {
        let hash = hash_password("Sup3r!Secret")?;
        let parsed = PasswordHash::new(&hash).map_err(|err| anyhow!("{err}"))?;
        assert!(Argon2::default()
            .verify_password(b"Sup3r!Secret", &parsed)
            .is_ok());
        // A second hash of the same password must differ (random salt).
        assert_ne!(hash, hash_password("Sup3r!Secret")?);
        Ok(())
    }

    #[tokio::test]
    async fn issue_rejects_empty_email_before_touching_storage() -> Result<()> {
        let service = service()?;
        let result = service.issue("   ", Flow::Signup).await;
        assert!(matches!(result, Err(OtpError::InvalidInput(_))));
        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_empty_code_before_touching_storage() -> Result<()> {
        let service = service()?;
        let result = service
            .validate_submission("alice@example.com", Flow::Signup, " ")
            .await;
        assert!(matches!(result, Err(OtpError::InvalidInput(_))));
        Ok(())
    }
}
