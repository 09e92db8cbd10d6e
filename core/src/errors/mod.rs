//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, BlacklistError, TokenError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Blacklist(#[from] BlacklistError),
}

impl DomainError {
    /// Whether this error means the presented credential was not accepted
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            DomainError::Token(
                TokenError::MalformedToken
                    | TokenError::InvalidSignature
                    | TokenError::ExpiredToken
                    | TokenError::WrongTokenKind { .. }
                    | TokenError::RevokedToken
                    | TokenError::RevocationCheckUnavailable
            ) | DomainError::Auth(AuthError::InvalidCredentials)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
