//! Shared configuration and response types for TokenWard
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (JWT, revocation store, roles, server, logging)
//! - The error response body returned by the HTTP boundary

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthorizationConfig, CacheConfig, ConfigError, Environment, JwtConfig,
    LoggingConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
