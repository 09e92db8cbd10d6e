//! # Infrastructure Layer
//!
//! Concrete implementations of the ports defined in `tw_core`:
//!
//! - **Cache**: Redis client and the Redis-backed revocation ledger
//! - **Services**: bcrypt credential verification for login
//!
//! Redis 7.0 or newer is required (`EXPIRE ... NX|GT`).

// Re-export core types for convenience
pub use tw_core::errors::*;

/// Cache module - Redis client and the revocation ledger
pub mod cache;

/// Services module - Infrastructure service implementations
pub mod services;

use tw_core::errors::BlacklistError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// An operation did not finish within its deadline
    #[error("Cache operation {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl InfrastructureError {
    /// Whether the failure may clear up on its own
    ///
    /// Nothing in this crate retries; callers use this to pick a policy.
    pub fn is_transient(&self) -> bool {
        match self {
            InfrastructureError::Cache(e) => cache::redis_client::is_retriable_error(e),
            InfrastructureError::Timeout { .. } => true,
            InfrastructureError::Config(_) | InfrastructureError::General(_) => false,
        }
    }
}

impl From<InfrastructureError> for BlacklistError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Timeout {
                operation,
                timeout_ms,
            } => BlacklistError::Timeout {
                operation,
                timeout_ms,
            },
            other => BlacklistError::Unavailable {
                message: other.to_string(),
            },
        }
    }
}
