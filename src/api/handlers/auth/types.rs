//! Request/response types for the auth endpoints.
//!
//! Raw payloads are deserialized as-is, then converted into validated inputs
//! at the handler boundary so `InvalidInput` surfaces immediately instead of
//! deep inside the lifecycle logic.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::otp::service::{normalize_email, SignupProfile};
use crate::otp::OtpError;

use super::utils::{strong_password, valid_email};

/// Uniform `{success, message}` body returned by every auth endpoint.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    #[must_use]
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn err(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SendOtpRequest {
    pub email: String,
}

impl SendOtpRequest {
    /// Validate and normalize the email, or fail with `InvalidInput`.
    pub fn into_email(self) -> Result<String, OtpError> {
        let email = normalize_email(&self.email);
        if email.is_empty() {
            return Err(OtpError::InvalidInput("Email required"));
        }
        if !valid_email(&email) {
            return Err(OtpError::InvalidInput("Valid email required"));
        }
        Ok(email)
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifySignupRequest {
    pub email: String,
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Validated signup verification input.
pub struct VerifySignupInput {
    pub email: String,
    pub code: String,
    pub profile: SignupProfile,
}

impl TryFrom<VerifySignupRequest> for VerifySignupInput {
    type Error = OtpError;

    fn try_from(request: VerifySignupRequest) -> Result<Self, Self::Error> {
        let email = normalize_email(&request.email);
        if email.is_empty() || !valid_email(&email) {
            return Err(OtpError::InvalidInput("Valid email required"));
        }
        let code = request.code.trim().to_string();
        if code.is_empty() {
            return Err(OtpError::InvalidInput("Code required"));
        }
        let first_name = request.first_name.trim().to_string();
        let last_name = request.last_name.trim().to_string();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(OtpError::InvalidInput("First and last name required"));
        }
        if !strong_password(&request.password) {
            return Err(OtpError::InvalidInput(
                "Password must be at least 8 characters and include uppercase, lowercase, number and special character",
            ));
        }
        Ok(Self {
            email,
            code,
            profile: SignupProfile {
                first_name,
                last_name,
                password: request.password,
            },
        })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Validated password reset input.
pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

impl TryFrom<ResetPasswordRequest> for ResetPasswordInput {
    type Error = OtpError;

    fn try_from(request: ResetPasswordRequest) -> Result<Self, Self::Error> {
        let email = normalize_email(&request.email);
        if email.is_empty() || !valid_email(&email) {
            return Err(OtpError::InvalidInput("Valid email required"));
        }
        let code = request.code.trim().to_string();
        if code.is_empty() {
            return Err(OtpError::InvalidInput("Code required"));
        }
        if !strong_password(&request.new_password) {
            return Err(OtpError::InvalidInput(
                "Password must be at least 8 characters and include uppercase, lowercase, number and special character",
            ));
        }
        Ok(Self {
            email,
            code,
            new_password: request.new_password,
        })
    }
}

/// Body returned once signup verification succeeds; carries the freshly
/// issued session token.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifySignupResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}
