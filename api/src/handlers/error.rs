//! Mapping of domain errors onto HTTP responses
//!
//! Every failure to verify a presented token produces the same 401 body, so a
//! client cannot tell an expired token from a revoked or forged one.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;
use tracing::{error, warn};
use tw_core::errors::{AuthError, DomainError, TokenError};
use tw_shared::{error_codes, ErrorResponse};

/// Message for every rejected bearer token
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or expired credentials";

/// Status code for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Token(TokenError::Signing { .. } | TokenError::KeyLoad { .. }) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
            AuthError::RevocationFailed => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::UnknownRole { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DomainError::Blacklist(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Response body for a domain error
///
/// Internal details never reach the body; they are logged instead.
pub fn error_body(error: &DomainError) -> ErrorResponse {
    match error {
        DomainError::Token(TokenError::Signing { .. } | TokenError::KeyLoad { .. }) => {
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
        }
        DomainError::Token(_) => {
            ErrorResponse::new(error_codes::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
        }
        DomainError::Auth(AuthError::InvalidCredentials) => {
            ErrorResponse::new(error_codes::INVALID_CREDENTIALS, "Invalid email or password")
        }
        DomainError::Auth(AuthError::InsufficientRole { .. }) => ErrorResponse::new(
            error_codes::FORBIDDEN,
            "Your role does not permit this operation",
        ),
        DomainError::Auth(AuthError::RevocationFailed) | DomainError::Blacklist(_) => {
            ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Revocation service unavailable, please retry",
            )
        }
        DomainError::Validation { message } => {
            ErrorResponse::new(error_codes::VALIDATION_ERROR, message.clone())
        }
        DomainError::Auth(AuthError::UnknownRole { .. }) | DomainError::Internal { .. } => {
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
        }
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let status = status_for(error);
    if status.is_server_error() {
        error!(error = %error, status = status.as_u16(), "Request failed");
    } else {
        warn!(error = %error, status = status.as_u16(), "Request rejected");
    }
    HttpResponse::build(status).json(error_body(error))
}

/// Domain error carried through actix's error channel
///
/// Lets middleware and `?` in handlers produce the same responses as
/// `handle_domain_error`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApiError(error)
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        ApiError(error.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError(error.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        handle_domain_error(&self.0)
    }
}
