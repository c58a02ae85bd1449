//! Signup flow endpoints: issue a code, then verify and complete registration.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use tracing::error;

use crate::otp::{Flow, OtpService};

use super::error_response;
use super::session::insert_session;
use super::types::{ApiMessage, SendOtpRequest, VerifySignupInput, VerifySignupRequest, VerifySignupResponse};

/// Issue a signup verification code and mail it to the address.
#[utoipa::path(
    post,
    path = "/v1/auth/signup/otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code sent", body = ApiMessage),
        (status = 400, description = "Invalid email or already verified", body = ApiMessage),
        (status = 429, description = "Resend cooldown active", body = ApiMessage)
    ),
    tag = "auth"
)]
pub async fn send_signup_otp(
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

    match service.issue(&email, Flow::Signup).await {
        Ok(()) => (StatusCode::OK, Json(ApiMessage::ok("OTP sent to email"))),
        Err(err) => error_response(&err),
    }
}

/// Verify the signup code, complete registration, and issue a session.
#[utoipa::path(
    post,
    path = "/v1/auth/signup/verify",
    request_body = VerifySignupRequest,
    responses(
        (status = 200, description = "Account created", body = VerifySignupResponse),
        (status = 400, description = "Invalid input, code, or expired code", body = ApiMessage),
        (status = 429, description = "Attempt ceiling reached", body = ApiMessage)
    ),
    tag = "auth"
)]
pub async fn verify_signup(
    service: Extension<OtpService>,
    pool: Extension<PgPool>,
    payload: Option<Json<VerifySignupRequest>>,
) -> axum::response::Response {
    let request: VerifySignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return missing_payload().into_response(),
    };

    let input = match VerifySignupInput::try_from(request) {
        Ok(input) => input,
        Err(err) => return error_response(&err).into_response(),
    };

    let account_id = match service
        .verify_signup(&input.email, &input.code, input.profile)
        .await
    {
        Ok(account_id) => account_id,
        Err(err) => return error_response(&err).into_response(),
    };

    // The account is verified either way; a session failure only costs the
    // user a login.
    match insert_session(&pool, account_id).await {
        Ok(token) => (
            StatusCode::OK,
            Json(VerifySignupResponse {
                success: true,
                message: "Account created successfully".to_string(),
                token,
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to issue session after signup: {err}");
            (
                StatusCode::OK,
                Json(ApiMessage::ok("Account created successfully, please log in")),
            )
                .into_response()
        }
    }
}

fn missing_payload() -> (StatusCode, Json<ApiMessage>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiMessage::err("Missing payload".to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    use crate::otp::mailer::LogOtpMailer;

    fn extensions() -> Result<(Extension<OtpService>, Extension<PgPool>)> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let service = OtpService::new(pool.clone(), Arc::new(LogOtpMailer));
        Ok((Extension(service), Extension(pool)))
    }

    #[tokio::test]
    async fn send_signup_otp_missing_payload() -> Result<()> {
        let (service, _pool) = extensions()?;
        let response = send_signup_otp(service, None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn send_signup_otp_rejects_malformed_email() -> Result<()> {
        let (service, _pool) = extensions()?;
        let response = send_signup_otp(
            service,
            Some(Json(SendOtpRequest {
                email: "not-an-email".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn verify_signup_missing_payload() -> Result<()> {
        let (service, pool) = extensions()?;
        let response = verify_signup(service, pool, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn verify_signup_rejects_weak_password() -> Result<()> {
        let (service, pool) = extensions()?;
        let response = verify_signup(
            service,
            pool,
            Some(Json(VerifySignupRequest {
                email: "alice@example.com".to_string(),
                code: "123456".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Doe".to_string(),
                password: "weak".to_string(),
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
