//! # TokenWard Core
//!
//! Session credential engine: issuance of paired access/refresh tokens,
//! stateless verification, single-use refresh rotation, revocation through an
//! external blacklist, and role-based authorization of verified identities.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{Identity, Role, TokenKind, TokenPair};
pub use errors::{AuthError, BlacklistError, DomainError, TokenError};
pub use repositories::{BlacklistStore, InMemoryBlacklistStore};
pub use services::{
    ClockSource, CredentialVerifier, RoleAuthorizer, SigningKeyProvider, TokenService,
    TokenServiceConfig,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    #[tokio::test]
    async fn test_root_reexports_cover_a_full_round() {
        let keys = crate::services::SigningKeys::hmac(
            jsonwebtoken::Algorithm::HS256,
            b"root-reexport-secret",
        )
        .unwrap();
        let service = crate::TokenService::new(
            crate::InMemoryBlacklistStore::new(),
            Arc::new(crate::SigningKeyProvider::new(keys)),
            crate::TokenServiceConfig::default(),
        )
        .unwrap();

        let pair: crate::TokenPair = service.issue("user-1", crate::Role::Admin).unwrap();
        let identity: crate::Identity = service
            .verify(&pair.access_token, crate::TokenKind::Access)
            .await
            .unwrap();

        assert_eq!(identity.role, crate::Role::Admin);
        assert!(matches!(
            service.verify(&pair.access_token, crate::TokenKind::Refresh).await,
            Err(crate::DomainError::Token(crate::TokenError::WrongTokenKind { .. }))
        ));
    }
}
