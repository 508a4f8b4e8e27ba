use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{CheckoutUrlRequest, CheckoutUrlResponse};
use crate::handlers::{handle_domain_error, validation_error_response};
use crate::routes::extract_bearer_token;

/// Handler for POST /api/v1/checkout-url
///
/// The session token is read from the session cookie, or from an
/// `Authorization: Bearer` header when no cookie is sent.
pub async fn checkout_url(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<CheckoutUrlRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let token = req
        .cookie(&state.cookie.name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| extract_bearer_token(&req));

    match state.gate.authorize(request.cart_id.trim(), token.as_deref()).await {
        Ok(checkout_url) => HttpResponse::Ok().json(CheckoutUrlResponse { checkout_url }),
        Err(error) => handle_domain_error(&error),
    }
}
