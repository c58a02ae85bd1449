//! Auth endpoints: OTP-gated signup and password reset.

use axum::{http::StatusCode, Json};
use tracing::error;

use crate::otp::OtpError;

pub mod reset;
pub mod session;
pub mod signup;
pub mod types;
mod utils;

pub use reset::{forgot_password, reset_password};
pub use signup::{send_signup_otp, verify_signup};

use types::ApiMessage;

/// Map a lifecycle failure to its HTTP status and `{success, message}` body.
///
/// Internal faults are logged here and reported with a generic message.
pub(crate) fn error_response(err: &OtpError) -> (StatusCode, Json<ApiMessage>) {
    let status = match err {
        OtpError::InvalidInput(_)
        | OtpError::AlreadyVerified
        | OtpError::NotFound
        | OtpError::Expired
        | OtpError::InvalidCode => StatusCode::BAD_REQUEST,
        OtpError::AccountNotFound => StatusCode::NOT_FOUND,
        OtpError::TooManyRequests | OtpError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
        OtpError::Internal(inner) => {
            error!("otp lifecycle failure: {inner:?}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::err("Something went wrong".to_string())),
            );
        }
    };
    (status, Json(ApiMessage::err(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn error_kinds_map_to_expected_statuses() {
        let cases = [
            (OtpError::InvalidInput("Email required"), StatusCode::BAD_REQUEST),
            (OtpError::AlreadyVerified, StatusCode::BAD_REQUEST),
            (OtpError::AccountNotFound, StatusCode::NOT_FOUND),
            (OtpError::TooManyRequests, StatusCode::TOO_MANY_REQUESTS),
            (OtpError::NotFound, StatusCode::BAD_REQUEST),
            (OtpError::Expired, StatusCode::BAD_REQUEST),
            (OtpError::TooManyAttempts, StatusCode::TOO_MANY_REQUESTS),
            (OtpError::InvalidCode, StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            let (status, body) = error_response(&err);
            assert_eq!(status, expected, "{err}");
            assert!(!body.success);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let (status, body) = error_response(&OtpError::Internal(anyhow!("pool exhausted")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Something went wrong");
    }
}
