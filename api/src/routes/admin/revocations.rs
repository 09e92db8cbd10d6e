use actix_web::{web, HttpResponse};
use tracing::info;
use tw_core::{repositories::BlacklistStore, services::CredentialVerifier};

use crate::dto::auth::SessionRevocationsResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;
use crate::routes::auth::AppState;

/// Handler for DELETE /admin/revocations/{jti}
///
/// Removes a jti from the blacklist. Answers 204 whether or not the jti was
/// revoked, so the call can be repeated.
pub async fn reinstate<B, V>(
    state: web::Data<AppState<B, V>>,
    auth: AuthContext,
    jti: web::Path<String>,
) -> HttpResponse
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    let jti = jti.into_inner();
    match state.token_service.reinstate(&jti).await {
        Ok(removed) => {
            info!(jti = %jti, removed, admin = %auth.subject_id(), "Reinstate requested");
            HttpResponse::NoContent().finish()
        }
        Err(error) => handle_domain_error(&error),
    }
}

/// Handler for GET /admin/sessions/{sid}/revocations
pub async fn session_revocations<B, V>(
    state: web::Data<AppState<B, V>>,
    sid: web::Path<String>,
) -> HttpResponse
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    let sid = sid.into_inner();
    match state.token_service.revoked_in_session(&sid).await {
        Ok(jtis) => {
            let mut revoked_jtis: Vec<String> = jtis.into_iter().collect();
            revoked_jtis.sort();
            HttpResponse::Ok().json(SessionRevocationsResponse {
                session_id: sid,
                revoked_jtis,
            })
        }
        Err(error) => handle_domain_error(&error),
    }
}
