use actix_web::{web, HttpResponse};
use tracing::info;
use tw_core::{
    errors::{AuthError, DomainError},
    repositories::BlacklistStore,
    services::CredentialVerifier,
};
use validator::Validate;

use crate::dto::auth::LoginRequest;
use crate::handlers::error::handle_domain_error;

use super::AppState;

/// Handler for POST /auth/login
///
/// Checks the credentials and issues a token pair under a new session.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "doctor@example.com",
///     "password": "string"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "token_type": "Bearer",
///     "access_expires_in": 900,
///     "refresh_expires_in": 604800,
///     "session_id": "..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed email or empty password
/// - 401 Unauthorized: Unknown email or wrong password
/// - 500 Internal Server Error: Token signing failure
pub async fn login<B, V>(
    state: web::Data<AppState<B, V>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_domain_error(&DomainError::Validation {
            message: errors.to_string(),
        });
    }

    let principal = match state
        .credentials
        .verify(&request.email, &request.password)
        .await
    {
        Ok(Some(principal)) => principal,
        Ok(None) => return handle_domain_error(&AuthError::InvalidCredentials.into()),
        Err(error) => return handle_domain_error(&error),
    };

    match state
        .token_service
        .issue(&principal.subject_id, principal.role)
    {
        Ok(pair) => {
            info!(subject = %principal.subject_id, sid = %pair.session_id, "Login succeeded");
            HttpResponse::Ok().json(pair)
        }
        Err(error) => handle_domain_error(&error),
    }
}
