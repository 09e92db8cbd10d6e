//! Redis configuration for the revocation ledger

use serde::{Deserialize, Serialize};

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL (`rediss://` for TLS)
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Upper bound for a single store operation in milliseconds
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Connection attempts at startup before giving up
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Enable cache key prefix
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            operation_timeout_ms: default_operation_timeout_ms(),
            connect_retries: default_connect_retries(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let url = std::env::var("REDIS_URL").unwrap_or(defaults.url);
        let connection_timeout = std::env::var("REDIS_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connection_timeout);
        let operation_timeout_ms = std::env::var("REDIS_OPERATION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.operation_timeout_ms);

        Self {
            url,
            connection_timeout,
            operation_timeout_ms,
            key_prefix: std::env::var("REDIS_KEY_PREFIX").ok(),
            ..defaults
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

    /// Set the per-operation timeout
    pub fn with_operation_timeout_ms(mut self, millis: u64) -> Self {
        self.operation_timeout_ms = millis;
        self
    }

    /// Per-operation timeout as a `Duration`
    pub fn operation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.operation_timeout_ms)
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_operation_timeout_ms() -> u64 {
    1000
}

fn default_connect_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key_with_prefix() {
        let config = CacheConfig::default().with_prefix("tw");
        assert_eq!(config.make_key("blacklist:jti:abc"), "tw:blacklist:jti:abc");
    }

    #[test]
    fn test_make_key_without_prefix() {
        let config = CacheConfig::default();
        assert_eq!(config.make_key("blacklist:jti:abc"), "blacklist:jti:abc");
    }

    #[test]
    fn test_operation_timeout() {
        let config = CacheConfig::new("redis://cache:6379").with_operation_timeout_ms(250);
        assert_eq!(config.operation_timeout(), std::time::Duration::from_millis(250));
        assert_eq!(config.url, "redis://cache:6379");
    }
}
