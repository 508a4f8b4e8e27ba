//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::{parse_env, read_env};

/// Redis configuration, used when rate windows are counted in Redis
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Number of connection attempts before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled after each failure
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Prefix prepended to every key
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: read_env("REDIS_URL").unwrap_or(defaults.url),
            max_retries: parse_env("REDIS_MAX_RETRIES", defaults.max_retries)
                .unwrap_or(defaults.max_retries),
            retry_delay_ms: parse_env("REDIS_RETRY_DELAY_MS", defaults.retry_delay_ms)
                .unwrap_or(defaults.retry_delay_ms),
            key_prefix: read_env("REDIS_KEY_PREFIX"),
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key() {
        let config = CacheConfig::new("redis://cache:6379");
        assert_eq!(config.make_key("rl:start"), "rl:start");

        let config = config.with_prefix("cg");
        assert_eq!(config.make_key("rl:start"), "cg:rl:start");
    }
}
