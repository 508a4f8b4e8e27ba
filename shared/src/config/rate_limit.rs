//! Rate limiting configuration module
//!
//! Each protected action carries an ordered list of fixed-window rules.
//! Rules are evaluated in order and the first denial wins.

use serde::{Deserialize, Serialize};

use super::{read_env, ConfigError};

/// What a rule counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitScope {
    /// Client IP address
    Origin,
    /// Normalized phone number
    Contact,
}

impl RateLimitScope {
    /// Short name used when composing window keys
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::Origin => "ip",
            RateLimitScope::Contact => "phone",
        }
    }
}

/// One fixed-window rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitRule {
    pub scope: RateLimitScope,

    /// Allowed requests per window
    pub limit: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

impl RateLimitRule {
    pub const fn new(scope: RateLimitScope, limit: u32, window_seconds: u64) -> Self {
        Self {
            scope,
            limit,
            window_seconds,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Rules for starting a challenge
    pub start: Vec<RateLimitRule>,

    /// Rules for verifying a code
    pub verify: Vec<RateLimitRule>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            start: vec![
                RateLimitRule::new(RateLimitScope::Origin, 3, 60),
                RateLimitRule::new(RateLimitScope::Origin, 10, 3600),
                RateLimitRule::new(RateLimitScope::Contact, 3, 60),
                RateLimitRule::new(RateLimitScope::Contact, 10, 3600),
            ],
            verify: vec![
                RateLimitRule::new(RateLimitScope::Origin, 20, 60),
                RateLimitRule::new(RateLimitScope::Origin, 100, 3600),
            ],
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    ///
    /// `RATE_LIMIT_START_RULES` / `RATE_LIMIT_VERIFY_RULES` override the
    /// defaults with a comma separated list of `scope:limit/window_seconds`,
    /// e.g. `ip:3/60,phone:10/3600`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(enabled) = read_env("RATE_LIMIT_ENABLED") {
            config.enabled = enabled != "false" && enabled != "0";
        }
        if let Some(raw) = read_env("RATE_LIMIT_START_RULES") {
            config.start = parse_rules("RATE_LIMIT_START_RULES", &raw)?;
        }
        if let Some(raw) = read_env("RATE_LIMIT_VERIFY_RULES") {
            config.verify = parse_rules("RATE_LIMIT_VERIFY_RULES", &raw)?;
        }

        Ok(config)
    }

    /// Disabled configuration, useful in tests
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Parse a rule list such as `ip:3/60,phone:10/3600`
pub fn parse_rules(name: &str, raw: &str) -> Result<Vec<RateLimitRule>, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: name.to_string(),
        reason,
    };

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (scope, rest) = item
                .split_once(':')
                .ok_or_else(|| invalid(format!("missing scope in '{}'", item)))?;
            let scope = match scope {
                "ip" | "origin" => RateLimitScope::Origin,
                "phone" | "contact" => RateLimitScope::Contact,
                other => return Err(invalid(format!("unknown scope '{}'", other))),
            };
            let (limit, window) = rest
                .split_once('/')
                .ok_or_else(|| invalid(format!("missing window in '{}'", item)))?;
            let limit: u32 = limit
                .parse()
                .map_err(|_| invalid(format!("bad limit in '{}'", item)))?;
            let window_seconds: u64 = window
                .parse()
                .map_err(|_| invalid(format!("bad window in '{}'", item)))?;
            if limit == 0 || window_seconds == 0 {
                return Err(invalid(format!("limit and window must be positive in '{}'", item)));
            }
            Ok(RateLimitRule::new(scope, limit, window_seconds))
        })
        .collect()
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.start.len(), 4);
        assert_eq!(config.start[0], RateLimitRule::new(RateLimitScope::Origin, 3, 60));
        assert_eq!(config.start[3], RateLimitRule::new(RateLimitScope::Contact, 10, 3600));
        assert_eq!(config.verify, vec![
            RateLimitRule::new(RateLimitScope::Origin, 20, 60),
            RateLimitRule::new(RateLimitScope::Origin, 100, 3600),
        ]);
    }

    #[test]
    fn test_parse_rules() {
        let rules = parse_rules("X", "ip:5/30, phone:2/600").unwrap();
        assert_eq!(rules, vec![
            RateLimitRule::new(RateLimitScope::Origin, 5, 30),
            RateLimitRule::new(RateLimitScope::Contact, 2, 600),
        ]);
    }

    #[test]
    fn test_parse_rules_rejects_garbage() {
        assert!(parse_rules("X", "ip5/30").is_err());
        assert!(parse_rules("X", "device:5/30").is_err());
        assert!(parse_rules("X", "ip:0/30").is_err());
        assert!(parse_rules("X", "ip:5").is_err());
    }
}
