use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{VerifyRequest, VerifyResponse};
use crate::handlers::{handle_domain_error, validation_error_response};
use crate::routes::extract_client_ip;

/// Handler for POST /api/v1/otp/verify
///
/// On success returns `{ "token": "...", "expiresAt": "..." }` and sets the
/// token as an HttpOnly session cookie living as long as the verified session.
pub async fn verify(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<VerifyRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let client_ip = extract_client_ip(&req);
    let cart_id = request.cart_id.trim();

    match state.engine.verify(cart_id, request.code.trim(), &client_ip).await {
        Ok(outcome) => {
            let max_age = state.engine.config().session_ttl.num_seconds();
            let cookie = Cookie::build(state.cookie.name.clone(), outcome.token.clone())
                .path("/")
                .http_only(true)
                .secure(state.cookie.secure)
                .same_site(SameSite::Strict)
                .max_age(CookieDuration::seconds(max_age))
                .finish();

            HttpResponse::Ok()
                .cookie(cookie)
                .json(VerifyResponse::from(outcome))
        }
        Err(error) => {
            tracing::debug!(subject_id = cart_id, origin = %client_ip, error = %error, "OTP verify refused");
            handle_domain_error(&error)
        }
    }
}
