//! Main token service implementation

use chrono::Duration as ChronoDuration;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::{Identity, Role, TokenKind, TokenPair};
use crate::errors::{AuthError, BlacklistError, DomainError, TokenError};
use crate::repositories::BlacklistStore;

use super::clock::{ClockSource, SystemClock};
use super::codec::TokenCodec;
use super::config::TokenServiceConfig;
use super::key_manager::SigningKeyProvider;

/// Smallest TTL written to the blacklist, so a token at its last second is
/// still covered
const MIN_REVOCATION_TTL: Duration = Duration::from_secs(1);

/// Service for issuing, verifying, rotating and revoking JWT token pairs
pub struct TokenService<B: BlacklistStore> {
    pub(crate) store: B,
    codec: TokenCodec,
    config: TokenServiceConfig,
    /// Refresh jtis whose consume write failed here with an unknown outcome,
    /// mapped to the token's `exp`
    unsettled: Mutex<HashMap<String, i64>>,
}

impl<B: BlacklistStore> TokenService<B> {
    /// Creates a new token service reading time from the system clock
    ///
    /// # Arguments
    ///
    /// * `store` - Revocation ledger
    /// * `keys` - Active signing keys
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService` instance or a validation error for a bad config
    pub fn new(
        store: B,
        keys: Arc<SigningKeyProvider>,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        Self::with_clock(store, keys, config, Arc::new(SystemClock))
    }

    /// Creates a new token service with an explicit clock
    pub fn with_clock(
        store: B,
        keys: Arc<SigningKeyProvider>,
        config: TokenServiceConfig,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let codec = TokenCodec::new(keys, clock, config.issuer.clone());
        Ok(Self {
            store,
            codec,
            config,
            unsettled: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    /// Issues a new token pair under a fresh linkage id
    ///
    /// # Arguments
    ///
    /// * `subject_id` - The user's id
    /// * `role` - The user's role
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Access and refresh tokens sharing a linkage id
    /// * `Err(DomainError)` - Signing failed
    pub fn issue(&self, subject_id: &str, role: Role) -> Result<TokenPair, DomainError> {
        let sid = Uuid::new_v4().to_string();
        let pair = self.issue_in_session(subject_id, role, &sid)?;
        info!(sid = %sid, role = %role, "Issued token pair");
        Ok(pair)
    }

    fn issue_in_session(
        &self,
        subject_id: &str,
        role: Role,
        sid: &str,
    ) -> Result<TokenPair, DomainError> {
        let now = self.codec.clock().now();

        let access = Identity::new(
            subject_id,
            role,
            TokenKind::Access,
            sid,
            now,
            ChronoDuration::seconds(self.config.access_token_expiry_seconds),
            self.config.issuer.as_str(),
        );
        let refresh = Identity::new(
            subject_id,
            role,
            TokenKind::Refresh,
            sid,
            now,
            ChronoDuration::seconds(self.config.refresh_token_expiry_seconds),
            self.config.issuer.as_str(),
        );

        Ok(TokenPair::new(
            self.codec.encode(&access)?,
            self.codec.encode(&refresh)?,
            self.config.access_token_expiry_seconds,
            self.config.refresh_token_expiry_seconds,
            sid.to_string(),
        ))
    }

    /// Verifies a token of the expected kind
    ///
    /// Checks run cheapest first: decode, kind, then one blacklist lookup
    /// covering both the jti and the session.
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - The decoded claims
    /// * `Err(TokenError::RevocationCheckUnavailable)` - The ledger could not
    ///   be read in time; the token is rejected
    pub async fn verify(&self, token: &str, expected: TokenKind) -> Result<Identity, DomainError> {
        let identity = self.decode_kind(token, expected)?;

        if self.is_revoked(&identity).await? {
            debug!(jti = %identity.jti, sid = %identity.sid, "Rejected revoked token");
            return Err(TokenError::RevokedToken.into());
        }

        Ok(identity)
    }

    /// Exchanges a refresh token for a new pair in the same session
    ///
    /// The presented token is consumed with an atomic insert into the
    /// blacklist. If that insert fails nothing is issued and the same refresh
    /// token may be presented again. The failed write may still have landed,
    /// so the next presentation of that jti to this service completes the
    /// rotation instead of counting as reuse.
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let identity = self.decode_kind(refresh_token, TokenKind::Refresh)?;

        if self.is_revoked(&identity).await? {
            if let Some(pair) = self.complete_unsettled(&identity).await? {
                return Ok(pair);
            }
            self.handle_refresh_reuse(&identity).await;
            return Err(TokenError::RevokedToken.into());
        }

        let pair = self.issue_in_session(&identity.sub, identity.role, &identity.sid)?;

        let ttl = self.revocation_ttl(&identity);
        let consumed = match self
            .timed(
                "put_if_absent",
                self.store.put_if_absent(&identity.jti, &identity.sid, ttl),
            )
            .await
        {
            Ok(consumed) => consumed,
            Err(e) => {
                error!(jti = %identity.jti, error = %e, "Failed to consume refresh token");
                self.mark_unsettled(&identity);
                return Err(AuthError::RevocationFailed.into());
            }
        };

        if !consumed {
            if let Some(pair) = self.complete_unsettled(&identity).await? {
                return Ok(pair);
            }
            warn!(jti = %identity.jti, sid = %identity.sid, "Refresh token consumed concurrently");
            return Err(TokenError::RevokedToken.into());
        }

        self.take_unsettled(&identity.jti);
        info!(sid = %identity.sid, "Rotated token pair");
        Ok(pair)
    }

    /// Revokes a single token until it would have expired
    ///
    /// Revoking an already revoked token succeeds.
    pub async fn revoke(&self, token: &str) -> Result<(), DomainError> {
        let identity = self.codec.decode(token)?;
        let ttl = self.revocation_ttl(&identity);
        self.take_unsettled(&identity.jti);

        self.timed(
            "put_with_linkage",
            self.store.put_with_linkage(&identity.jti, &identity.sid, ttl),
        )
        .await
        .map_err(|e| {
            error!(jti = %identity.jti, error = %e, "Failed to revoke token");
            DomainError::Auth(AuthError::RevocationFailed)
        })?;

        info!(jti = %identity.jti, kind = %identity.kind, "Revoked token");
        Ok(())
    }

    /// Revokes every token carrying `sid`, including ones not yet seen
    pub async fn revoke_session(&self, sid: &str) -> Result<(), DomainError> {
        let ttl = Duration::from_secs(self.config.refresh_token_expiry_seconds.max(1) as u64);

        self.timed("revoke_linkage", self.store.revoke_linkage(sid, ttl))
            .await
            .map_err(|e| {
                error!(sid = %sid, error = %e, "Failed to revoke session");
                DomainError::Auth(AuthError::RevocationFailed)
            })?;

        info!(sid = %sid, "Revoked session");
        Ok(())
    }

    /// Removes a jti from the blacklist
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The jti was revoked and is now usable again
    /// * `Ok(false)` - The jti was not revoked
    pub async fn reinstate(&self, jti: &str) -> Result<bool, DomainError> {
        let removed = self.timed("delete", self.store.delete(jti)).await?;
        if removed {
            info!(jti = %jti, "Reinstated token");
        }
        Ok(removed)
    }

    /// Revoked jtis recorded under `sid`
    pub async fn revoked_in_session(&self, sid: &str) -> Result<HashSet<String>, DomainError> {
        Ok(self
            .timed("exists_by_linkage", self.store.exists_by_linkage(sid))
            .await?)
    }

    /// Checks that the blacklist store answers
    pub async fn check_store(&self) -> Result<(), DomainError> {
        Ok(self.timed("ping", self.store.ping()).await?)
    }

    fn decode_kind(&self, token: &str, expected: TokenKind) -> Result<Identity, DomainError> {
        let identity = self.codec.decode(token)?;
        if identity.kind != expected {
            return Err(TokenError::WrongTokenKind {
                expected,
                actual: identity.kind,
            }
            .into());
        }
        Ok(identity)
    }

    async fn is_revoked(&self, identity: &Identity) -> Result<bool, DomainError> {
        self.timed(
            "is_revoked",
            self.store.is_revoked(&identity.jti, &identity.sid),
        )
        .await
        .map_err(|e| {
            warn!(jti = %identity.jti, error = %e, "Revocation check unavailable, failing closed");
            DomainError::Token(TokenError::RevocationCheckUnavailable)
        })
    }

    /// A refresh token revoked by its own jti was already consumed; presenting
    /// it again means it was copied
    async fn handle_refresh_reuse(&self, identity: &Identity) {
        if !self.config.revoke_session_on_refresh_reuse {
            return;
        }

        match self.timed("exists", self.store.exists(&identity.jti)).await {
            Ok(true) => {
                warn!(
                    jti = %identity.jti,
                    sid = %identity.sid,
                    "Consumed refresh token presented again, revoking session"
                );
                if let Err(e) = self.revoke_session(&identity.sid).await {
                    error!(sid = %identity.sid, error = %e, "Session revocation after reuse failed");
                }
            }
            Ok(false) => {}
            Err(e) => {
                debug!(jti = %identity.jti, error = %e, "Skipped reuse check");
            }
        }
    }

    /// Issues the pair owed for a refresh token whose consume write failed
    /// here and has since been found committed
    ///
    /// Each unsettled jti is completed at most once, and never once its
    /// session is revoked.
    async fn complete_unsettled(
        &self,
        identity: &Identity,
    ) -> Result<Option<TokenPair>, DomainError> {
        if !self.take_unsettled(&identity.jti) {
            return Ok(None);
        }

        let session_revoked = match self
            .timed(
                "is_linkage_revoked",
                self.store.is_linkage_revoked(&identity.sid),
            )
            .await
        {
            Ok(revoked) => revoked,
            Err(e) => {
                warn!(jti = %identity.jti, error = %e, "Revocation check unavailable, failing closed");
                self.mark_unsettled(identity);
                return Err(TokenError::RevocationCheckUnavailable.into());
            }
        };
        if session_revoked {
            return Ok(None);
        }

        let pair = self.issue_in_session(&identity.sub, identity.role, &identity.sid)?;
        info!(sid = %identity.sid, "Rotated token pair after an unconfirmed consume");
        Ok(Some(pair))
    }

    fn mark_unsettled(&self, identity: &Identity) {
        let now = self.codec.clock().now().timestamp();
        let mut unsettled = self.unsettled.lock().unwrap_or_else(|e| e.into_inner());
        unsettled.retain(|_, exp| *exp > now);
        unsettled.insert(identity.jti.clone(), identity.exp);
    }

    fn take_unsettled(&self, jti: &str) -> bool {
        self.unsettled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(jti)
            .is_some()
    }

    fn revocation_ttl(&self, identity: &Identity) -> Duration {
        identity
            .remaining_ttl(self.codec.clock().now())
            .max(MIN_REVOCATION_TTL)
    }

    async fn timed<T, F>(&self, operation: &'static str, call: F) -> Result<T, BlacklistError>
    where
        F: Future<Output = Result<T, BlacklistError>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BlacklistError::Timeout {
                operation,
                timeout_ms: self.config.store_timeout.as_millis() as u64,
            }),
        }
    }
}
