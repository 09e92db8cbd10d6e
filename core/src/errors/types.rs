//! Error types for token verification, authorization and the revocation ledger
//!
//! The HTTP boundary maps every `TokenError` to the same authentication
//! failure, so the variants here may be precise without leaking which check
//! failed to clients.

use thiserror::Error;

use crate::domain::entities::{Role, TokenKind};

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Wrong token kind: expected {expected}, got {actual}")]
    WrongTokenKind { expected: TokenKind, actual: TokenKind },

    #[error("Token revoked")]
    RevokedToken,

    /// The revocation ledger could not be consulted; the token is rejected.
    #[error("Revocation check unavailable")]
    RevocationCheckUnavailable,

    #[error("Token signing failed: {message}")]
    Signing { message: String },

    #[error("Signing key could not be loaded: {message}")]
    KeyLoad { message: String },
}

/// Authentication and authorization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Role {role} is not permitted for this operation")]
    InsufficientRole { role: Role },

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A revocation write did not complete; nothing was issued.
    #[error("Revocation failed")]
    RevocationFailed,

    #[error("Unknown role: {name}")]
    UnknownRole { name: String },
}

/// Errors raised by a `BlacklistStore` implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlacklistError {
    #[error("Blacklist {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Blacklist store unavailable: {message}")]
    Unavailable { message: String },
}
