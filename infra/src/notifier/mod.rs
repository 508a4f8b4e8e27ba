//! Notifier Module
//!
//! Delivery adapters for one-time codes:
//!
//! - **LogNotifier**: writes a masked delivery line to the log (development)
//! - **WebhookNotifier**: POSTs the code to an HTTP relay that owns the
//!   actual channel (SMS gateway, messaging provider)

use std::sync::Arc;

use cg_core::services::NotifierTrait;
use cg_shared::config::{Environment, NotifierConfig, NotifierKind};

pub mod log;
pub mod webhook;

pub use self::log::LogNotifier;
pub use webhook::WebhookNotifier;

use crate::InfrastructureError;

/// Create the notifier selected by configuration
///
/// The log notifier never delivers anything, so production refuses it.
pub fn create_notifier(
    config: &NotifierConfig,
    environment: Environment,
) -> Result<Arc<dyn NotifierTrait>, InfrastructureError> {
    match config.kind {
        NotifierKind::Log if environment.is_production() => Err(InfrastructureError::Config(
            "The log notifier cannot be used in production".to_string(),
        )),
        NotifierKind::Log => {
            tracing::warn!("Using log notifier: codes are not delivered");
            Ok(Arc::new(LogNotifier::new()))
        }
        NotifierKind::Webhook => {
            let url = config.webhook_url.as_deref().ok_or_else(|| {
                InfrastructureError::Config("NOTIFIER_WEBHOOK_URL is required for the webhook notifier".to_string())
            })?;
            Ok(Arc::new(WebhookNotifier::new(url, config.webhook_token.clone())?))
        }
    }
}
