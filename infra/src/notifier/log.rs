//! Development notifier that only logs

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use cg_core::errors::DeliveryError;
use cg_core::services::NotifierTrait;
use cg_shared::utils::mask_phone_number;

/// Logs each delivery with the phone masked and the code withheld
#[derive(Clone, Default)]
pub struct LogNotifier {
    /// Counter for tracking number of messages "sent"
    message_count: Arc<AtomicU64>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of messages handled
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotifierTrait for LogNotifier {
    async fn send_code(&self, contact: &str, _code: &str) -> Result<String, DeliveryError> {
        let message_id = format!("log-{}", Uuid::new_v4());
        self.message_count.fetch_add(1, Ordering::SeqCst);

        info!(
            phone = %mask_phone_number(contact),
            message_id = %message_id,
            "Verification code issued (log notifier, not delivered)"
        );

        Ok(message_id)
    }
}
