use actix_web::{web, HttpResponse};
use tracing::debug;
use tw_core::{repositories::BlacklistStore, services::CredentialVerifier};

use crate::dto::auth::LogoutRequest;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /auth/logout
///
/// Revokes the presented ACCESS token. A refresh token in the body is revoked
/// too when it belongs to the same session.
///
/// # Response
///
/// ## Success (204 No Content)
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
/// - 503 Service Unavailable: The access token was not revoked and the
///   request may be repeated
pub async fn logout<B, V>(
    state: web::Data<AppState<B, V>>,
    auth: AuthContext,
    body: Option<web::Json<LogoutRequest>>,
) -> HttpResponse
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    // The refresh token goes first: on a failure the access token still
    // works, so the client can repeat the logout
    let refresh_token = body.and_then(|body| body.into_inner().refresh_token);
    if let Some(refresh_token) = refresh_token {
        match state.token_service.codec().decode(&refresh_token) {
            Ok(identity) if identity.sid == auth.session_id() => {
                if let Err(error) = state.token_service.revoke(&refresh_token).await {
                    return handle_domain_error(&error);
                }
            }
            // Expired, foreign or forged refresh tokens need no revocation
            _ => debug!(sid = %auth.session_id(), "Ignored refresh token on logout"),
        }
    }

    if let Err(error) = state.token_service.revoke(&auth.token).await {
        return handle_domain_error(&error);
    }

    HttpResponse::NoContent().finish()
}

/// Handler for POST /auth/logout-all
///
/// Revokes every token of the caller's session, including refresh tokens the
/// server has never seen.
pub async fn logout_all<B, V>(state: web::Data<AppState<B, V>>, auth: AuthContext) -> HttpResponse
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    match state.token_service.revoke_session(auth.session_id()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(error) => handle_domain_error(&error),
    }
}
