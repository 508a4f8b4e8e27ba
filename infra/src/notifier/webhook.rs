//! HTTP relay notifier
//!
//! Sends `{"to": "+E164", "code": "123456"}` to a configured endpoint with
//! an optional bearer token. The relay answers with an optional message id.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use cg_core::errors::DeliveryError;
use cg_core::services::NotifierTrait;
use cg_shared::utils::mask_phone_number;

use crate::InfrastructureError;

/// Transport-level timeout; the engine applies its own per-attempt bound
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    to: &'a str,
    code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct RelayResponse {
    #[serde(default)]
    id: Option<String>,
}

/// POSTs codes to an HTTP relay
///
/// Makes a single attempt per call; retries belong to the engine.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    token: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Result<Self, InfrastructureError> {
        let url = url.into();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(InfrastructureError::Config(format!(
                "Notifier webhook URL must be http(s): {}",
                url
            )));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { client, url, token })
    }
}

#[async_trait]
impl NotifierTrait for WebhookNotifier {
    async fn send_code(&self, contact: &str, code: &str) -> Result<String, DeliveryError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&RelayRequest { to: contact, code });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DeliveryError::Timeout
            } else {
                DeliveryError::Unavailable {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                phone = %mask_phone_number(contact),
                status = status.as_u16(),
                "Notifier relay refused the message"
            );
            return Err(classify_status(status));
        }

        // An unreadable body still means the relay accepted the message
        let body: RelayResponse = response.json().await.unwrap_or_default();
        let message_id = body.id.unwrap_or_else(|| format!("relay-{}", Uuid::new_v4()));

        debug!(
            phone = %mask_phone_number(contact),
            message_id = %message_id,
            "Notifier relay accepted the message"
        );

        Ok(message_id)
    }
}

/// Map a non-success relay status to a delivery error
///
/// Client errors are permanent except for timeouts and throttling.
pub(crate) fn classify_status(status: StatusCode) -> DeliveryError {
    let message = format!("relay responded with HTTP {}", status.as_u16());
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => DeliveryError::Unavailable { message },
        s if s.is_client_error() => DeliveryError::Rejected { message },
        _ => DeliveryError::Unavailable { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            WebhookNotifier::new("ftp://relay.example.com", None),
            Err(InfrastructureError::Config(_))
        ));
        assert!(WebhookNotifier::new("https://relay.example.com/send", None).is_ok());
    }

    #[test]
    fn test_client_errors_are_permanent() {
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST),
            DeliveryError::Rejected { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY),
            DeliveryError::Rejected { .. }
        ));
    }

    #[test]
    fn test_throttling_and_server_errors_are_transient() {
        for status in [
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
        ] {
            assert!(matches!(classify_status(status), DeliveryError::Unavailable { .. }));
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(RelayRequest {
            to: "+15551230000",
            code: "012345",
        })
        .unwrap();

        assert_eq!(body, serde_json::json!({"to": "+15551230000", "code": "012345"}));
    }
}
