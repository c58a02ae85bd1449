//! Pure decision logic for the OTP lifecycle.
//!
//! Every function takes an explicit `now` so time-based guards (cooldown,
//! expiry) are deterministic under test. Persistence happens elsewhere; the
//! functions here only inspect and build [`OtpSlot`] values.

use chrono::{DateTime, Utc};

use super::crypto::hash_code;
use super::models::{Flow, OtpError, OtpSlot};

/// Enforce the resend cooldown before issuing a new code.
///
/// A prior issuance less than the cooldown window before `now` means the
/// caller has to wait. Absent `resend_at` (never issued, or cleared on
/// success) always passes.
pub fn check_cooldown(slot: &OtpSlot, flow: Flow, now: DateTime<Utc>) -> Result<(), OtpError> {
    if let Some(resend_at) = slot.resend_at {
        if now - resend_at < flow.resend_cooldown() {
            return Err(OtpError::TooManyRequests);
        }
    }
    Ok(())
}

/// Build the slot for a freshly issued code.
///
/// Overwrites any previous code for the flow: new hash, expiry at
/// `now + TTL`, attempt counter reset to zero, issuance time recorded for
/// the cooldown check.
#[must_use]
pub fn fresh_slot(flow: Flow, code: &str, now: DateTime<Utc>) -> OtpSlot {
    OtpSlot {
        code_hash: Some(hash_code(code)),
        expires_at: Some(now + flow.ttl()),
        attempts: 0,
        resend_at: Some(now),
    }
}

/// Validate a submitted code against a pending slot.
///
/// Check order is fixed: pending presence, expiry, attempt ceiling (before
/// any comparison), then hash comparison. On mismatch the caller is expected
/// to persist `slot.attempts + 1`; on success the caller clears the slot.
pub fn validate(
    slot: &OtpSlot,
    flow: Flow,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), OtpError> {
    let (Some(code_hash), Some(expires_at)) = (slot.code_hash.as_deref(), slot.expires_at) else {
        return Err(OtpError::NotFound);
    };

    if now >= expires_at {
        return Err(OtpError::Expired);
    }

    // The ceiling is checked before comparing so a locked-out slot leaks
    // nothing about code correctness.
    if slot.attempts >= flow.attempt_ceiling() {
        return Err(OtpError::TooManyAttempts);
    }

    if hash_code(submitted) != code_hash {
        return Err(OtpError::InvalidCode);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn cooldown_passes_without_prior_issuance() {
        let slot = OtpSlot::default();
        assert!(check_cooldown(&slot, Flow::Signup, base_now()).is_ok());
    }

    #[test]
    fn cooldown_blocks_within_window() {
        let now = base_now();
        let slot = fresh_slot(Flow::Signup, "123456", now);
        let result = check_cooldown(&slot, Flow::Signup, now + Duration::seconds(29));
        assert!(matches!(result, Err(OtpError::TooManyRequests)));
    }

    #[test]
    fn cooldown_passes_after_window() {
        let now = base_now();
        let slot = fresh_slot(Flow::Signup, "123456", now);
        assert!(check_cooldown(&slot, Flow::Signup, now + Duration::seconds(30)).is_ok());
    }

    #[test]
    fn fresh_slot_resets_attempts_and_sets_expiry() {
        let now = base_now();
        let slot = fresh_slot(Flow::Signup, "123456", now);
        assert_eq!(slot.attempts, 0);
        assert_eq!(slot.expires_at, Some(now + Duration::minutes(5)));
        assert_eq!(slot.resend_at, Some(now));
        assert_eq!(slot.code_hash.as_deref(), Some(hash_code("123456").as_str()));

        let slot = fresh_slot(Flow::Reset, "123456", now);
        assert_eq!(slot.expires_at, Some(now + Duration::minutes(10)));
    }

    #[test]
    fn reissue_overwrites_previous_code() {
        let now = base_now();
        let first = fresh_slot(Flow::Signup, "111111", now);
        let later = now + Duration::seconds(31);
        let second = fresh_slot(Flow::Signup, "222222", later);
        assert_ne!(first.code_hash, second.code_hash);
        // The old code no longer validates against the new slot.
        assert!(matches!(
            validate(&second, Flow::Signup, "111111", later),
            Err(OtpError::InvalidCode)
        ));
        assert!(validate(&second, Flow::Signup, "222222", later).is_ok());
    }

    #[test]
    fn validate_empty_slot_is_not_found() {
        let result = validate(&OtpSlot::default(), Flow::Signup, "123456", base_now());
        assert!(matches!(result, Err(OtpError::NotFound)));
    }

    #[test]
    fn validate_at_or_past_expiry_fails() {
        let now = base_now();
        let slot = fresh_slot(Flow::Reset, "123456", now);
        let at_expiry = now + Flow::Reset.ttl();
        assert!(matches!(
            validate(&slot, Flow::Reset, "123456", at_expiry),
            Err(OtpError::Expired)
        ));
        assert!(matches!(
            validate(&slot, Flow::Reset, "123456", at_expiry + Duration::seconds(1)),
            Err(OtpError::Expired)
        ));
    }

    #[test]
    fn validate_correct_code_before_expiry_succeeds() {
        let now = base_now();
        let slot = fresh_slot(Flow::Signup, "654321", now);
        assert!(validate(&slot, Flow::Signup, "654321", now + Duration::minutes(4)).is_ok());
    }

    #[test]
    fn wrong_code_is_invalid_and_counter_driven_lockout_follows() {
        let now = base_now();
        let mut slot = fresh_slot(Flow::Signup, "654321", now);

        // N wrong attempts: each one reports InvalidCode and the caller
        // increments the counter.
        for _ in 0..Flow::Signup.attempt_ceiling() {
            let result = validate(&slot, Flow::Signup, "000000", now);
            assert!(matches!(result, Err(OtpError::InvalidCode)));
            slot.attempts += 1;
        }

        // N+1th submission is locked out regardless of correctness.
        assert!(matches!(
            validate(&slot, Flow::Signup, "000000", now),
            Err(OtpError::TooManyAttempts)
        ));
        assert!(matches!(
            validate(&slot, Flow::Signup, "654321", now),
            Err(OtpError::TooManyAttempts)
        ));
    }

    #[test]
    fn reissue_is_the_only_recovery_from_lockout() {
        let now = base_now();
        let mut slot = fresh_slot(Flow::Reset, "654321", now);
        slot.attempts = Flow::Reset.attempt_ceiling();
        assert!(matches!(
            validate(&slot, Flow::Reset, "654321", now),
            Err(OtpError::TooManyAttempts)
        ));

        let later = now + Duration::seconds(31);
        let slot = fresh_slot(Flow::Reset, "112233", later);
        assert_eq!(slot.attempts, 0);
        assert!(validate(&slot, Flow::Reset, "112233", later).is_ok());
    }

    #[test]
    fn expiry_wins_over_lockout_and_mismatch() {
        let now = base_now();
        let mut slot = fresh_slot(Flow::Signup, "654321", now);
        slot.attempts = Flow::Signup.attempt_ceiling();
        let late = now + Duration::hours(1);
        assert!(matches!(
            validate(&slot, Flow::Signup, "000000", late),
            Err(OtpError::Expired)
        ));
    }
}
