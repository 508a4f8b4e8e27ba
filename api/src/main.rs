use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cg_api::{create_app, AppState, CookieSettings, Engine, Gate};
use cg_core::services::{
    ChallengeEngine, ChallengeEngineConfig, CheckoutGate, Clock, CodeCodec, SessionTokenConfig,
    SessionTokenIssuer, SubjectAttributeResolver, SystemClock,
};
use cg_infra::notifier::create_notifier;
use cg_infra::storefront::StorefrontCheckoutResolver;
use cg_infra::Backends;
use cg_shared::config::{AppConfig, LogFormat, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        storage_backend = ?config.storage_backend,
        rate_limit_backend = ?config.rate_limit_backend,
        "Starting CheckoutGate API server"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backends = Backends::connect(&config, clock.clone())
        .await
        .context("Failed to initialize storage backends")?;

    let notifier = create_notifier(&config.notifier, config.environment)
        .context("Failed to initialize code notifier")?;
    let codec = CodeCodec::new(&config.auth.hmac_secret)?;
    let tokens = Arc::new(SessionTokenIssuer::new(
        SessionTokenConfig::from_app(&config.auth, &config.otp),
        clock.clone(),
    )?);

    let engine: Arc<Engine> = Arc::new(ChallengeEngine::new(
        backends.store.clone(),
        backends.rate_limiter.clone(),
        notifier,
        codec,
        tokens.clone(),
        clock.clone(),
        ChallengeEngineConfig::from(&config.otp),
        config.rate_limit.clone(),
    ));

    let resolver: Arc<dyn SubjectAttributeResolver> = Arc::new(
        StorefrontCheckoutResolver::new(&config.storefront)
            .context("Failed to initialize storefront resolver")?,
    );
    let gate: Arc<Gate> = Arc::new(CheckoutGate::new(backends.store.clone(), resolver, tokens, clock));

    let app_state = web::Data::new(AppState::new(
        engine,
        gate,
        backends.clone(),
        CookieSettings::from(&config.auth),
        config.server.max_payload_size,
    ));

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(app_state.clone()).wrap(TracingLogger::default()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;

    info!("Server stopped, closing backends");
    backends.close().await;
    Ok(())
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the configured level when present.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}
