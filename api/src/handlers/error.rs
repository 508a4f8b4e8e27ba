//! Mapping of domain outcomes to HTTP responses
//!
//! Log-oriented error messages stay on the server; clients receive a stable
//! `error` code, a short message and, for policy refusals, the instant at
//! which retrying can succeed.

use actix_web::{http::StatusCode, HttpResponse};
use validator::ValidationErrors;

use cg_core::errors::{AccessError, ChallengeError, DomainError, TokenError};
use cg_shared::{error_codes, ErrorResponse};

/// Convert a domain error into the response sent to the client
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let (status, body) = match error {
        DomainError::Challenge(e) => challenge_response(e),
        DomainError::Token(TokenError::InvalidToken) => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new(error_codes::TOKEN_INVALID, "Invalid token"),
        ),
        DomainError::Access(AccessError::NotVerified) => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new(error_codes::NOT_VERIFIED, "Not verified"),
        ),
        DomainError::Access(AccessError::ResolveFailed(_)) => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::new(error_codes::UPSTREAM_ERROR, "Failed to retrieve checkout URL"),
        ),
        DomainError::Token(TokenError::SigningFailed)
        | DomainError::Storage { .. }
        | DomainError::Config { .. }
        | DomainError::Internal { .. } => {
            tracing::error!(error = %error, "Request failed with an internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(error_codes::INTERNAL_ERROR, "Internal server error"),
            )
        }
    };

    HttpResponse::build(status).json(body)
}

fn challenge_response(error: &ChallengeError) -> (StatusCode, ErrorResponse) {
    match error {
        ChallengeError::InvalidInput { field } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(invalid_input_code(field), format!("Invalid {}", field))
                .add_detail("field", field),
        ),
        ChallengeError::RateLimited { reset_at } => (
            StatusCode::TOO_MANY_REQUESTS,
            ErrorResponse::new(error_codes::RATE_LIMIT_EXCEEDED, "Too many requests")
                .with_retry_at(*reset_at),
        ),
        ChallengeError::ResendTooSoon {
            challenge_id,
            resend_eligible_at,
        } => (
            StatusCode::TOO_MANY_REQUESTS,
            ErrorResponse::new(error_codes::RESEND_TOO_SOON, "A code was sent recently")
                .with_retry_at(*resend_eligible_at)
                .add_detail("challengeId", challenge_id)
                .add_detail("resendAt", resend_eligible_at),
        ),
        ChallengeError::DeliveryFailed => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::new(error_codes::DELIVERY_FAILED, "Failed to send OTP"),
        ),
        ChallengeError::Locked { locked_until } => (
            StatusCode::LOCKED,
            ErrorResponse::new(
                error_codes::ACCOUNT_LOCKED,
                "Too many attempts. Please request a new code after some time.",
            )
            .with_retry_at(*locked_until),
        ),
        // Clients cannot tell a missing challenge from an expired one
        ChallengeError::NotFound | ChallengeError::Expired => (
            StatusCode::GONE,
            ErrorResponse::new(error_codes::OTP_EXPIRED, "OTP expired"),
        ),
        ChallengeError::InvalidCode { remaining, .. } => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(error_codes::OTP_INVALID, "Invalid code")
                .add_detail("attemptsRemaining", remaining),
        ),
    }
}

fn invalid_input_code(field: &str) -> &'static str {
    match field {
        "contact" => error_codes::PHONE_INVALID,
        _ => error_codes::VALIDATION_ERROR,
    }
}

/// 400 response listing the first message of every rejected field
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data");

    for (field, field_errors) in errors.field_errors() {
        let message = field_errors
            .first()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .unwrap_or_default();
        response = response.add_detail(field, message);
    }

    HttpResponse::BadRequest().json(response)
}
