//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Access/refresh pair issuance under a shared linkage id
//! - Verification against signature, expiry, kind and the blacklist
//! - Single-use refresh rotation
//! - Revocation of single tokens and whole sessions
//! - HMAC and RS256 key management with atomic rotation

pub mod clock;
mod codec;
mod config;
mod key_manager;
mod service;

#[cfg(test)]
mod tests;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use codec::TokenCodec;
pub use config::TokenServiceConfig;
pub use key_manager::{SigningKeyProvider, SigningKeys};
pub use service::TokenService;
