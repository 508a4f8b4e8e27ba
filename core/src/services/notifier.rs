//! Out-of-band code delivery

use async_trait::async_trait;

use crate::errors::DeliveryError;

/// Delivers a raw code to a contact
///
/// Called only after the challenge is durable. The engine owns retries;
/// implementations make a single attempt per call.
#[async_trait]
pub trait NotifierTrait: Send + Sync {
    /// Returns a provider message id on success
    async fn send_code(&self, contact: &str, code: &str) -> Result<String, DeliveryError>;
}
