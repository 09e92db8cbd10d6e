//! Unit tests for the Redis ledger's key layout and error mapping

use std::time::Duration;
use tw_core::errors::BlacklistError;
use tw_shared::CacheConfig;

use crate::cache::blacklist::{index_key, jti_key, session_key, ttl_seconds};
use crate::InfrastructureError;

#[test]
fn test_key_layout_with_prefix() {
    let config = CacheConfig::default().with_prefix("tw");

    assert_eq!(jti_key(&config, "abc"), "tw:blacklist:jti:abc");
    assert_eq!(session_key(&config, "s1"), "tw:blacklist:sid:s1");
    assert_eq!(index_key(&config, "s1"), "tw:blacklist:sid:s1:jtis");
}

#[test]
fn test_key_layout_without_prefix() {
    let config = CacheConfig::default();
    assert_eq!(jti_key(&config, "abc"), "blacklist:jti:abc");
}

#[test]
fn test_ttl_seconds_rounds_up() {
    assert_eq!(ttl_seconds(Duration::from_secs(30)), 30);
    assert_eq!(ttl_seconds(Duration::from_millis(30_001)), 31);
    assert_eq!(ttl_seconds(Duration::from_millis(200)), 1);
    assert_eq!(ttl_seconds(Duration::ZERO), 1);
}

#[test]
fn test_timeout_maps_to_blacklist_timeout() {
    let error = InfrastructureError::Timeout {
        operation: "exists",
        timeout_ms: 250,
    };
    assert_eq!(
        BlacklistError::from(error),
        BlacklistError::Timeout {
            operation: "exists",
            timeout_ms: 250,
        }
    );
}

#[test]
fn test_redis_error_maps_to_unavailable() {
    let error = InfrastructureError::Cache(redis::RedisError::from(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "Connection refused",
    )));
    assert!(matches!(
        BlacklistError::from(error),
        BlacklistError::Unavailable { .. }
    ));
}
