//! Server configuration module
//!
//! Also carries the settings of the two outbound collaborators the server
//! talks to: the code notifier and the storefront checkout lookup.

use serde::{Deserialize, Serialize};

use super::{parse_env, read_env, ConfigError};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Maximum JSON payload size in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0, // Use all CPU cores
            max_payload_size: default_max_payload_size(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            host: read_env("SERVER_HOST").unwrap_or(d.host),
            port: parse_env("SERVER_PORT", d.port)?,
            workers: parse_env("SERVER_WORKERS", d.workers)?,
            max_payload_size: parse_env("SERVER_MAX_PAYLOAD_SIZE", d.max_payload_size)?,
        })
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How codes leave the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Write a masked delivery line to the log (development only)
    Log,
    /// POST the code to an HTTP relay
    Webhook,
}

/// Notifier configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    pub kind: NotifierKind,

    /// Relay endpoint, required for `Webhook`
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Bearer token sent to the relay
    #[serde(default)]
    pub webhook_token: Option<String>,
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("kind", &self.kind)
            .field("webhook_url", &self.webhook_url)
            .field("webhook_token", &self.webhook_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Log,
            webhook_url: None,
            webhook_token: None,
        }
    }
}

impl NotifierConfig {
    /// Create from environment variables
    ///
    /// Selects the webhook relay whenever `NOTIFIER_WEBHOOK_URL` is set.
    pub fn from_env() -> Self {
        let webhook_url = read_env("NOTIFIER_WEBHOOK_URL");
        let kind = match read_env("NOTIFIER_KIND").as_deref() {
            Some("log") => NotifierKind::Log,
            Some("webhook") => NotifierKind::Webhook,
            _ if webhook_url.is_some() => NotifierKind::Webhook,
            _ => NotifierKind::Log,
        };

        Self {
            kind,
            webhook_url,
            webhook_token: read_env("NOTIFIER_WEBHOOK_TOKEN"),
        }
    }
}

/// Storefront GraphQL configuration for checkout URL lookup
#[derive(Clone, Deserialize, Serialize)]
pub struct StorefrontConfig {
    /// GraphQL endpoint
    pub api_url: String,

    /// Storefront access token
    pub api_token: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_storefront_timeout_ms")]
    pub timeout_ms: u64,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl StorefrontConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let api_url = read_env("SHOPIFY_STOREFRONT_API_URL").unwrap_or_default();
        let api_token = read_env("SHOPIFY_STOREFRONT_API_TOKEN").unwrap_or_default();

        Self {
            api_url,
            api_token,
            timeout_ms: parse_env("SHOPIFY_STOREFRONT_TIMEOUT_MS", default_storefront_timeout_ms())
                .unwrap_or_else(|_| default_storefront_timeout_ms()),
        }
    }

    /// Both endpoint and token are present
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.api_token.is_empty()
    }
}

fn default_max_payload_size() -> usize {
    16 * 1024 // 16 KB
}

fn default_storefront_timeout_ms() -> u64 {
    5_000
}
