use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{StartRequest, StartResponse};
use crate::handlers::{handle_domain_error, validation_error_response};
use crate::routes::extract_client_ip;

/// Handler for POST /api/v1/otp/start
///
/// Issues a code for the cart and sends it to the phone.
///
/// # Request Body
///
/// ```json
/// { "cartId": "gid://shopify/Cart/abc", "phone": "+15551230000" }
/// ```
///
/// # Response
///
/// `200 OK` with `{ "challengeId": "...", "resendAt": "2030-01-01T00:00:45Z" }`.
/// Refusals use the standard error body; `429` carries `retryAt`.
pub async fn start(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<StartRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let client_ip = extract_client_ip(&req);
    let cart_id = request.cart_id.trim();

    match state.engine.start(cart_id, &request.phone, &client_ip).await {
        Ok(outcome) => HttpResponse::Ok().json(StartResponse::from(outcome)),
        Err(error) => {
            tracing::debug!(subject_id = cart_id, origin = %client_ip, error = %error, "OTP start refused");
            handle_domain_error(&error)
        }
    }
}
