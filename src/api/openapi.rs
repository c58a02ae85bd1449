//! OpenAPI document for the served routes.

use utoipa::OpenApi;

use super::handlers::auth::types::{
    ApiMessage, ResetPasswordRequest, SendOtpRequest, VerifySignupRequest, VerifySignupResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::health::health,
        super::handlers::auth::signup::send_signup_otp,
        super::handlers::auth::signup::verify_signup,
        super::handlers::auth::reset::forgot_password,
        super::handlers::auth::reset::reset_password,
    ),
    components(schemas(
        ApiMessage,
        SendOtpRequest,
        VerifySignupRequest,
        VerifySignupResponse,
        ResetPasswordRequest,
    )),
    tags(
        (name = "auth", description = "OTP-gated signup and password reset"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
