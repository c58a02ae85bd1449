//! Password reset endpoints: issue a reset code, then consume it.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::otp::{Flow, OtpService};

use super::error_response;
use super::types::{ApiMessage, ResetPasswordInput, ResetPasswordRequest, SendOtpRequest};

/// Issue a password reset code for an existing account.
#[utoipa::path(
    post,
    path = "/v1/auth/password/otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code sent", body = ApiMessage),
        (status = 404, description = "No account for this email", body = ApiMessage),
        (status = 429, description = "Resend cooldown active", body = ApiMessage)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    service: Extension<OtpService>,
    payload: Option<Json<SendOtpRequest>>,
) -> impl IntoResponse {
    let request: SendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return missing_payload(),
    };

    let email = match request.into_email() {
        Ok(email) => email,
        Err(err) => return error_response(&err),
    };

    match service.issue(&email, Flow::Reset).await {
        Ok(()) => (StatusCode::OK, Json(ApiMessage::ok("OTP sent to email"))),
        Err(err) => error_response(&err),
    }
}

/// Consume a reset code and overwrite the account password.
#[utoipa::path(
    post,
    path = "/v1/auth/password/reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = ApiMessage),
        (status = 400, description = "Invalid input, code, or expired code", body = ApiMessage),
        (status = 429, description = "Attempt ceiling reached", body = ApiMessage)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    service: Extension<OtpService>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return missing_payload(),
    };

    let input = match ResetPasswordInput::try_from(request) {
        Ok(input) => input,
        Err(err) => return error_response(&err),
    };

    match service
        .reset_password(&input.email, &input.code, &input.new_password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiMessage::ok("Password reset successful")),
        ),
        Err(err) => error_response(&err),
    }
}

fn missing_payload() -> (StatusCode, Json<ApiMessage>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiMessage::err("Missing payload".to_string())),
    )
}
