//! Application factory
//!
//! Builds the actix-web `App` from a fully wired `AppState`. The binary adds
//! request tracing on top; tests use the factory as is.

use actix_web::{dev::ServiceFactory, web, App, HttpResponse};
use std::sync::Arc;
use tw_core::{
    domain::entities::Role,
    errors::DomainError,
    repositories::BlacklistStore,
    services::CredentialVerifier,
};
use tw_shared::{error_codes, ErrorResponse};

use crate::handlers::ApiError;
use crate::middleware::{JwtAuth, RequireRoles, TokenServiceWrapper};
use crate::routes::{admin, auth, health::health, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<B, V>(
    app_state: web::Data<AppState<B, V>>,
) -> App<
    impl ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    B: BlacklistStore + 'static,
    V: CredentialVerifier + 'static,
{
    let verifier: Arc<dyn TokenServiceWrapper> = app_state.token_service.clone();
    let authorizer = web::Data::from(Arc::clone(&app_state.authorizer));

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        ApiError(DomainError::Validation {
            message: err.to_string(),
        })
        .into()
    });

    App::new()
        .app_data(app_state)
        .app_data(web::Data::new(verifier))
        .app_data(authorizer)
        .app_data(json_config)
        .route("/health", web::get().to(health::<B, V>))
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(auth::login::<B, V>))
                .route("/refresh", web::post().to(auth::refresh::<B, V>))
                .route(
                    "/validate",
                    web::get().to(auth::validate).wrap(JwtAuth::access()),
                )
                .route(
                    "/logout",
                    web::post()
                        .to(auth::logout::<B, V>)
                        .wrap(JwtAuth::access()),
                )
                .route(
                    "/logout-all",
                    web::post()
                        .to(auth::logout_all::<B, V>)
                        .wrap(JwtAuth::access()),
                ),
        )
        .service(
            web::scope("/admin")
                // RequireRoles runs after JwtAuth: the last wrap is outermost
                .wrap(RequireRoles::new([Role::Admin]))
                .wrap(JwtAuth::access())
                .route(
                    "/revocations/{jti}",
                    web::delete().to(admin::reinstate::<B, V>),
                )
                .route(
                    "/sessions/{sid}/revocations",
                    web::get().to(admin::session_revocations::<B, V>),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
