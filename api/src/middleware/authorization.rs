//! Role check for routes behind `JwtAuth`.
//!
//! Must be wrapped inside `JwtAuth` so the `AuthContext` is already present:
//! actix runs the last `wrap` first.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use tw_core::{
    domain::entities::Role,
    errors::{DomainError, TokenError},
    services::RoleAuthorizer,
};

use super::auth::AuthContext;
use crate::handlers::handle_domain_error;

/// Middleware factory admitting only the listed roles
pub struct RequireRoles {
    required: Rc<Vec<Role>>,
}

impl RequireRoles {
    pub fn new(required: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required: Rc::new(required.into_iter().collect()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRoles
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRolesMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRolesMiddleware {
            service: Rc::new(service),
            required: Rc::clone(&self.required),
        }))
    }
}

pub struct RequireRolesMiddleware<S> {
    service: Rc<S>,
    required: Rc<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for RequireRolesMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = Rc::clone(&self.required);

        Box::pin(async move {
            if let Err(error) = authorize(&req, &required) {
                let response = handle_domain_error(&error);
                return Ok(req.into_response(response).map_into_right_body());
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

fn authorize(req: &ServiceRequest, required: &[Role]) -> Result<(), DomainError> {
    let role = req
        .extensions()
        .get::<AuthContext>()
        .map(AuthContext::role)
        .ok_or(TokenError::MalformedToken)?;

    let authorizer = req
        .app_data::<web::Data<RoleAuthorizer>>()
        .ok_or_else(|| DomainError::Internal {
            message: "role authorizer is not registered".to_string(),
        })?;

    Ok(authorizer.check(role, required)?)
}
