//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing and role authorization configuration
//! - `cache` - Redis configuration for the revocation ledger
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod auth;
pub mod cache;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{AuthorizationConfig, JwtConfig};
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Settings the server refuses to start with
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {environment} when signing with {algorithm}")]
    DefaultSecret {
        environment: Environment,
        algorithm: String,
    },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Role authorization configuration
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Revocation ledger configuration
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            jwt: JwtConfig::default(),
            authorization: AuthorizationConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            jwt: JwtConfig::from_env(),
            authorization: AuthorizationConfig::from_env(),
            cache: CacheConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Rejects settings that are unsafe outside development
    ///
    /// The built-in HMAC secret is public, so production must supply its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.is_production() && self.signs_with_default_secret() {
            return Err(ConfigError::DefaultSecret {
                environment: self.environment,
                algorithm: self.jwt.algorithm.clone(),
            });
        }
        Ok(())
    }

    /// Returns human-readable warnings about insecure settings
    pub fn security_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.signs_with_default_secret() {
            warnings.push("JWT_SECRET is not set; using the development secret".to_string());
        }
        warnings
    }

    fn signs_with_default_secret(&self) -> bool {
        self.jwt.is_using_default_secret() && self.jwt.algorithm.starts_with("HS")
    }
}
