use chrono::{DateTime, Duration, Utc};
use sqlx::{postgres::PgRow, FromRow, Row};
use thiserror::Error;
use uuid::Uuid;

/// The two independent purposes a code can serve.
///
/// Each flow carries its own TTL, attempt ceiling, and column prefix; issuing
/// or clearing a code for one flow never touches the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Signup,
    Reset,
}

impl Flow {
    /// How long a freshly issued code stays valid.
    #[must_use]
    pub fn ttl(self) -> Duration {
        match self {
            Self::Signup => Duration::minutes(5),
            Self::Reset => Duration::minutes(10),
        }
    }

    /// Wrong submissions tolerated before the code is locked out.
    #[must_use]
    pub const fn attempt_ceiling(self) -> i32 {
        match self {
            Self::Signup => 5,
            Self::Reset => 10,
        }
    }

    /// Minimum wait between successive issuances for the same account.
    #[must_use]
    pub fn resend_cooldown(self) -> Duration {
        Duration::seconds(30)
    }

    /// Human-readable purpose label included in outbound mail.
    #[must_use]
    pub const fn purpose(self) -> &'static str {
        match self {
            Self::Signup => "Signup verification code",
            Self::Reset => "Password reset code",
        }
    }

    /// Prefix of the `accounts` columns backing this flow's slot.
    pub(crate) const fn column_prefix(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Reset => "reset",
        }
    }
}

/// OTP state for one flow of one account.
///
/// A dedicated value type rather than loose fields on the account, so the
/// lifecycle code never reaches into unrelated account attributes. `None`
/// everywhere and `attempts == 0` means no code was ever issued (or the last
/// one was consumed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpSlot {
    pub code_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub resend_at: Option<DateTime<Utc>>,
}

impl OtpSlot {
    /// Whether a code is pending for this slot (expired or not).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.code_hash.is_some() && self.expires_at.is_some()
    }
}

/// Subset of the account row the OTP lifecycle works with.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub verified: bool,
    pub signup: OtpSlot,
    pub reset: OtpSlot,
}

impl Account {
    /// The slot backing the given flow.
    #[must_use]
    pub fn slot(&self, flow: Flow) -> &OtpSlot {
        match flow {
            Flow::Signup => &self.signup,
            Flow::Reset => &self.reset,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Account {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            password_hash: row.try_get("password_hash")?,
            verified: row.try_get("verified")?,
            signup: OtpSlot {
                code_hash: row.try_get("signup_otp_hash")?,
                expires_at: row.try_get("signup_otp_expires_at")?,
                attempts: row.try_get("signup_otp_attempts")?,
                resend_at: row.try_get("signup_otp_resend_at")?,
            },
            reset: OtpSlot {
                code_hash: row.try_get("reset_otp_hash")?,
                expires_at: row.try_get("reset_otp_expires_at")?,
                attempts: row.try_get("reset_otp_attempts")?,
                resend_at: row.try_get("reset_otp_resend_at")?,
            },
        })
    }
}

/// Caller-visible outcomes of the OTP lifecycle.
///
/// Every failure is reported synchronously with a distinguishing kind; none
/// are retried internally. Delivery failures are logged at the point of
/// detection and never surface here (the persisted code stays valid and a
/// later issuance is the recovery path).
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("account already verified")]
    AlreadyVerified,
    #[error("account not found")]
    AccountNotFound,
    #[error("wait before requesting another code")]
    TooManyRequests,
    #[error("no pending code")]
    NotFound,
    #[error("code expired")]
    Expired,
    #[error("too many attempts, request a new code")]
    TooManyAttempts,
    #[error("invalid code")]
    InvalidCode,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
