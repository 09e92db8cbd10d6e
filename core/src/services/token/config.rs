//! Configuration for the token service

use std::time::Duration;
use tw_shared::{CacheConfig, JwtConfig};

use crate::domain::entities::JWT_ISSUER;
use crate::errors::DomainError;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Access token lifetime in seconds
    pub access_token_expiry_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry_seconds: i64,
    /// Upper bound on every blacklist call
    pub store_timeout: Duration,
    /// JWT issuer claim
    pub issuer: String,
    /// Revoke the whole session when a consumed refresh token is replayed
    pub revoke_session_on_refresh_reuse: bool,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_token_expiry_seconds: 900,
            refresh_token_expiry_seconds: 604800,
            store_timeout: Duration::from_millis(1000),
            issuer: JWT_ISSUER.to_string(),
            revoke_session_on_refresh_reuse: true,
        }
    }
}

impl TokenServiceConfig {
    /// Builds the service configuration from the JWT and cache sections
    pub fn from_configs(jwt: &JwtConfig, cache: &CacheConfig) -> Self {
        Self {
            access_token_expiry_seconds: jwt.access_token_expiry,
            refresh_token_expiry_seconds: jwt.refresh_token_expiry,
            store_timeout: cache.operation_timeout(),
            issuer: jwt.issuer.clone(),
            ..Default::default()
        }
    }

    pub fn with_access_expiry_seconds(mut self, seconds: i64) -> Self {
        self.access_token_expiry_seconds = seconds;
        self
    }

    pub fn with_refresh_expiry_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_expiry_seconds = seconds;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Rejects non-positive lifetimes and a zero store timeout
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.access_token_expiry_seconds <= 0 || self.refresh_token_expiry_seconds <= 0 {
            return Err(DomainError::Validation {
                message: "token lifetimes must be positive".to_string(),
            });
        }
        if self.store_timeout.is_zero() {
            return Err(DomainError::Validation {
                message: "store timeout must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
