use actix_web::{web, HttpResponse};
use tracing::warn;
use tw_core::{repositories::BlacklistStore, services::CredentialVerifier};

use crate::dto::auth::HealthResponse;
use crate::routes::auth::AppState;

/// Handler for GET /health
///
/// 200 while the blacklist store answers, 503 otherwise: without the store
/// every authenticated request fails closed.
pub async fn health<B, V>(state: web::Data<AppState<B, V>>) -> HttpResponse
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    let store_up = match state.token_service.check_store().await {
        Ok(()) => true,
        Err(error) => {
            warn!(error = %error, "Blacklist store health check failed");
            false
        }
    };

    let body = HealthResponse {
        status: if store_up { "healthy" } else { "degraded" }.to_string(),
        blacklist: if store_up { "up" } else { "down" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if store_up {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
