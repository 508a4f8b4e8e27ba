//! Application state and factory
//!
//! This module holds the shared services handed to every handler and
//! provides the factory for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{error::InternalError, web, App, HttpResponse};

use cg_core::repositories::ChallengeStore;
use cg_core::services::{ChallengeEngine, CheckoutGate, NotifierTrait, RateLimiterTrait, SubjectAttributeResolver};
use cg_infra::Backends;
use cg_shared::config::AuthConfig;
use cg_shared::{error_codes, ErrorResponse};

use crate::routes::{checkout, otp};

/// Challenge engine wired with runtime-selected adapters
pub type Engine = ChallengeEngine<dyn ChallengeStore, dyn RateLimiterTrait, dyn NotifierTrait>;

/// Checkout gate wired with runtime-selected adapters
pub type Gate = CheckoutGate<dyn ChallengeStore, dyn SubjectAttributeResolver>;

/// Attributes of the session cookie set after a successful verification
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

impl From<&AuthConfig> for CookieSettings {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            name: auth.cookie_name.clone(),
            secure: auth.cookie_secure,
        }
    }
}

/// Application state that holds shared services
pub struct AppState {
    pub engine: Arc<Engine>,
    pub gate: Arc<Gate>,
    pub backends: Backends,
    pub cookie: CookieSettings,
    pub max_payload_size: usize,
}

impl AppState {
    pub fn new(
        engine: Arc<Engine>,
        gate: Arc<Gate>,
        backends: Backends,
        cookie: CookieSettings,
        max_payload_size: usize,
    ) -> Self {
        Self {
            engine,
            gate,
            backends,
            cookie,
            max_payload_size,
        }
    }
}

/// Create and configure the application with all dependencies
///
/// Request tracing is added by the caller so tests can drive the bare app.
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json_config = json_config(app_state.max_payload_size);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/otp")
                        .route("/start", web::post().to(otp::start))
                        .route("/verify", web::post().to(otp::verify)),
                )
                .route("/checkout-url", web::post().to(checkout::checkout_url)),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Malformed or oversized JSON bodies answer with the standard error shape
fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default().limit(limit).error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        let response = HttpResponse::BadRequest().json(ErrorResponse::new(
            error_codes::VALIDATION_ERROR,
            "Request body is not valid JSON",
        ));
        InternalError::from_response(err, response).into()
    })
}

/// Health check endpoint handler
///
/// Reports unhealthy when a connected database or Redis server does not answer.
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = match state.backends.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::error!(error = %e, "Backend health check failed");
            false
        }
    };

    let body = serde_json::json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "service": "checkout-gate-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        "NOT_FOUND",
        "The requested resource was not found",
    ))
}
