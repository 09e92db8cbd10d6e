use actix_web::HttpResponse;

use crate::dto::auth::IdentityResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /auth/validate
///
/// Returns the claims of the ACCESS bearer token verified by `JwtAuth`.
pub async fn validate(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(IdentityResponse::from(auth.identity))
}
