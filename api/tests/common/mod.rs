//! Shared fixtures for the HTTP integration tests
#![allow(dead_code)]

use actix_web::{body::MessageBody, dev::ServiceResponse, web};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tw_api::routes::AppState;
use tw_core::errors::BlacklistError;
use tw_core::repositories::{BlacklistStore, InMemoryBlacklistStore};
use tw_core::services::{
    ClockSource, ManualClock, RoleAuthorizer, SigningKeyProvider, TokenService,
    TokenServiceConfig,
};
use tw_core::domain::entities::Role;
use tw_infra::services::InMemoryCredentialVerifier;
use tw_shared::JwtConfig;

pub const PASSWORD: &str = "correct horse battery staple";
pub const DOCTOR_EMAIL: &str = "doctor@example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub type TestState<B> = web::Data<AppState<B, InMemoryCredentialVerifier>>;

pub fn credentials() -> InMemoryCredentialVerifier {
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    InMemoryCredentialVerifier::new()
        .with_user(DOCTOR_EMAIL, Role::Doctor, "doctor-1", hash.clone())
        .with_user(ADMIN_EMAIL, Role::Admin, "admin-1", hash)
}

fn keys() -> Arc<SigningKeyProvider> {
    Arc::new(SigningKeyProvider::from_config(&JwtConfig::new("api-test-secret")).unwrap())
}

/// State over `store`, reading time from the system clock
pub fn state_with_store<B: BlacklistStore + 'static>(store: B) -> TestState<B> {
    let token_service = TokenService::new(store, keys(), TokenServiceConfig::default()).unwrap();
    web::Data::new(AppState {
        token_service: Arc::new(token_service),
        credentials: Arc::new(credentials()),
        authorizer: Arc::new(RoleAuthorizer::new()),
    })
}

/// State over an in-memory store, service and store sharing one manual clock
pub fn state_with_clock() -> (TestState<InMemoryBlacklistStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let store = InMemoryBlacklistStore::with_clock(clock.clone() as Arc<dyn ClockSource>);
    let token_service = TokenService::with_clock(
        store,
        keys(),
        TokenServiceConfig::default().with_access_expiry_seconds(60),
        clock.clone(),
    )
    .unwrap();
    let state = web::Data::new(AppState {
        token_service: Arc::new(token_service),
        credentials: Arc::new(credentials()),
        authorizer: Arc::new(RoleAuthorizer::new()),
    });
    (state, clock)
}

pub fn memory_state() -> TestState<InMemoryBlacklistStore> {
    state_with_store(InMemoryBlacklistStore::new())
}

pub async fn json_body<B: MessageBody>(resp: ServiceResponse<B>) -> serde_json::Value {
    actix_web::test::read_body_json(resp).await
}

fn unavailable() -> BlacklistError {
    BlacklistError::Unavailable {
        message: "connection refused".to_string(),
    }
}

/// A store that cannot be reached at all
pub struct DownStore;

#[async_trait]
impl BlacklistStore for DownStore {
    async fn put(&self, _jti: &str, _ttl: Duration) -> Result<(), BlacklistError> {
        Err(unavailable())
    }

    async fn exists(&self, _jti: &str) -> Result<bool, BlacklistError> {
        Err(unavailable())
    }

    async fn delete(&self, _jti: &str) -> Result<bool, BlacklistError> {
        Err(unavailable())
    }

    async fn put_with_linkage(
        &self,
        _jti: &str,
        _linkage: &str,
        _ttl: Duration,
    ) -> Result<(), BlacklistError> {
        Err(unavailable())
    }

    async fn exists_by_linkage(&self, _linkage: &str) -> Result<HashSet<String>, BlacklistError> {
        Err(unavailable())
    }

    async fn revoke_linkage(&self, _linkage: &str, _ttl: Duration) -> Result<(), BlacklistError> {
        Err(unavailable())
    }

    async fn is_linkage_revoked(&self, _linkage: &str) -> Result<bool, BlacklistError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), BlacklistError> {
        Err(unavailable())
    }
}

/// Reads succeed and report nothing revoked; every write fails
pub struct ReadOnlyStore;

#[async_trait]
impl BlacklistStore for ReadOnlyStore {
    async fn put(&self, _jti: &str, _ttl: Duration) -> Result<(), BlacklistError> {
        Err(unavailable())
    }

    async fn exists(&self, _jti: &str) -> Result<bool, BlacklistError> {
        Ok(false)
    }

    async fn delete(&self, _jti: &str) -> Result<bool, BlacklistError> {
        Err(unavailable())
    }

    async fn put_with_linkage(
        &self,
        _jti: &str,
        _linkage: &str,
        _ttl: Duration,
    ) -> Result<(), BlacklistError> {
        Err(unavailable())
    }

    async fn exists_by_linkage(&self, _linkage: &str) -> Result<HashSet<String>, BlacklistError> {
        Ok(HashSet::new())
    }

    async fn revoke_linkage(&self, _linkage: &str, _ttl: Duration) -> Result<(), BlacklistError> {
        Err(unavailable())
    }

    async fn is_linkage_revoked(&self, _linkage: &str) -> Result<bool, BlacklistError> {
        Ok(false)
    }

    async fn put_if_absent(
        &self,
        _jti: &str,
        _linkage: &str,
        _ttl: Duration,
    ) -> Result<bool, BlacklistError> {
        Err(unavailable())
    }
}

/// In-memory store whose second single-token revocation fails
pub struct SecondRevokeFailsStore {
    inner: InMemoryBlacklistStore,
    revokes: AtomicUsize,
}

impl SecondRevokeFailsStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryBlacklistStore::new(),
            revokes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BlacklistStore for SecondRevokeFailsStore {
    async fn put(&self, jti: &str, ttl: Duration) -> Result<(), BlacklistError> {
        self.inner.put(jti, ttl).await
    }

    async fn exists(&self, jti: &str) -> Result<bool, BlacklistError> {
        self.inner.exists(jti).await
    }

    async fn delete(&self, jti: &str) -> Result<bool, BlacklistError> {
        self.inner.delete(jti).await
    }

    async fn put_with_linkage(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<(), BlacklistError> {
        if self.revokes.fetch_add(1, Ordering::SeqCst) == 1 {
            return Err(unavailable());
        }
        self.inner.put_with_linkage(jti, linkage, ttl).await
    }

    async fn exists_by_linkage(&self, linkage: &str) -> Result<HashSet<String>, BlacklistError> {
        self.inner.exists_by_linkage(linkage).await
    }

    async fn revoke_linkage(&self, linkage: &str, ttl: Duration) -> Result<(), BlacklistError> {
        self.inner.revoke_linkage(linkage, ttl).await
    }

    async fn is_linkage_revoked(&self, linkage: &str) -> Result<bool, BlacklistError> {
        self.inner.is_linkage_revoked(linkage).await
    }

    async fn put_if_absent(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<bool, BlacklistError> {
        self.inner.put_if_absent(jti, linkage, ttl).await
    }
}
