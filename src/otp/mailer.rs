//! Notification delivery for one-time codes.
//!
//! The lifecycle manager hands the plaintext code and a purpose label to an
//! [`OtpMailer`] right after persisting the hashed code. Delivery is fire and
//! forget from the core's point of view: a failed send is logged and the code
//! stays valid, because issuing again is the recovery path.

use anyhow::Result;
use tracing::info;

/// Delivery abstraction for outbound codes.
pub trait OtpMailer: Send + Sync {
    /// Deliver `code` to `to` or return an error to be logged by the caller.
    fn send(&self, to: &str, code: &str, purpose: &str) -> Result<()>;
}

/// Local dev mailer that logs the code instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogOtpMailer;

impl OtpMailer for LogOtpMailer {
    fn send(&self, to: &str, code: &str, purpose: &str) -> Result<()> {
        info!(to, code, purpose, "otp mail send stub");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_mailer_always_succeeds() {
        let mailer = LogOtpMailer;
        assert!(mailer
            .send("alice@example.com", "123456", "Signup verification code")
            .is_ok());
    }
}
