//! Cache module for the Redis-backed revocation ledger
//!
//! This module provides the Redis client with connect retry and per-operation
//! deadlines, and the `BlacklistStore` implementation built on it.

pub mod blacklist;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use blacklist::RedisBlacklistStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use tw_shared::CacheConfig;
