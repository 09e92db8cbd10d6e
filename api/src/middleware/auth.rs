//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the bearer token from the Authorization header,
//! verifies it through the token service registered in app data, and injects
//! an `AuthContext` into the request.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use tw_core::{
    domain::entities::{Identity, Role, TokenKind},
    errors::{DomainError, TokenError},
    repositories::BlacklistStore,
    services::TokenService,
};

use crate::handlers::{handle_domain_error, ApiError};

/// Authentication context injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Verified claims of the presented token
    pub identity: Identity,
    /// The raw bearer token, kept for revocation
    pub token: String,
}

impl AuthContext {
    pub fn subject_id(&self) -> &str {
        &self.identity.sub
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn session_id(&self) -> &str {
        &self.identity.sid
    }
}

/// JWT authentication middleware factory
///
/// Accepts only tokens of one kind: protected routes take ACCESS tokens.
pub struct JwtAuth {
    kind: TokenKind,
}

impl JwtAuth {
    /// Requires an ACCESS bearer token
    pub fn access() -> Self {
        Self {
            kind: TokenKind::Access,
        }
    }

    /// Requires a REFRESH bearer token
    pub fn refresh() -> Self {
        Self {
            kind: TokenKind::Refresh,
        }
    }
}

impl Default for JwtAuth {
    fn default() -> Self {
        Self::access()
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            kind: self.kind,
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    kind: TokenKind,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let kind = self.kind;

        Box::pin(async move {
            let context = match authenticate(&req, kind).await {
                Ok(context) => context,
                Err(error) => {
                    let response = handle_domain_error(&error);
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(context);

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

async fn authenticate(req: &ServiceRequest, kind: TokenKind) -> Result<AuthContext, DomainError> {
    let token = extract_bearer_token(req.headers()).ok_or(TokenError::MalformedToken)?;

    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenServiceWrapper>>>()
        .ok_or_else(|| DomainError::Internal {
            message: "token service is not registered".to_string(),
        })?;

    let identity = token_service.verify_token(&token, kind).await?;
    Ok(AuthContext { identity, token })
}

/// Extracts the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|s| s.to_string())
}

/// Object-safe view of a `TokenService` for middleware, which cannot name the
/// service's store type
#[async_trait]
pub trait TokenServiceWrapper: Send + Sync {
    async fn verify_token(&self, token: &str, kind: TokenKind) -> Result<Identity, DomainError>;
}

#[async_trait]
impl<B: BlacklistStore + 'static> TokenServiceWrapper for TokenService<B> {
    async fn verify_token(&self, token: &str, kind: TokenKind) -> Result<Identity, DomainError> {
        self.verify(token, kind).await
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError(DomainError::Token(TokenError::MalformedToken)).into());

        ready(result)
    }
}

/// Raw bearer token for routes that verify it themselves
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = extract_bearer_token(req.headers())
            .map(BearerToken)
            .ok_or_else(|| ApiError(DomainError::Token(TokenError::MalformedToken)).into());

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        use actix_web::test;

        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();

        assert_eq!(
            extract_bearer_token(req.headers()),
            Some("test_token_123".to_string())
        );

        let req_no_bearer = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();

        assert_eq!(extract_bearer_token(req_no_bearer.headers()), None);

        let req_empty = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_srv_request();

        assert_eq!(extract_bearer_token(req_empty.headers()), None);

        let req_no_header = test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(req_no_header.headers()), None);
    }
}
