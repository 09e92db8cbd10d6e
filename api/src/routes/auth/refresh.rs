use actix_web::{web, HttpResponse};
use tw_core::{repositories::BlacklistStore, services::CredentialVerifier};

use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::BearerToken;

use super::AppState;

/// Handler for POST /auth/refresh
///
/// Exchanges the REFRESH bearer token for a new pair in the same session. The
/// presented token is single-use.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {refresh_token}
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid, expired, revoked or non-refresh token
/// - 503 Service Unavailable: The token could not be consumed; the request
///   may be retried once with the same token
pub async fn refresh<B, V>(state: web::Data<AppState<B, V>>, bearer: BearerToken) -> HttpResponse
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    match state.token_service.rotate(&bearer.0).await {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(error) => handle_domain_error(&error),
    }
}
