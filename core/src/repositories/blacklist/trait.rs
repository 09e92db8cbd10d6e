//! Blacklist store trait defining the revocation ledger contract.

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

use crate::errors::BlacklistError;

/// Keyed ledger of revoked token ids
///
/// Entries are written with a time-to-live no shorter than the remaining life
/// of the token they revoke, so a revoked token can never become valid again
/// by its entry expiring first. Implementations must be safe to share across
/// concurrent requests.
///
/// Every call may fail with a `BlacklistError`. Callers treat any error on a
/// read as "cannot tell" and reject the token.
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Record `jti` as revoked for `ttl`
    ///
    /// Writing an already-present key refreshes its TTL and still succeeds.
    async fn put(&self, jti: &str, ttl: Duration) -> Result<(), BlacklistError>;

    /// Whether `jti` is currently revoked
    async fn exists(&self, jti: &str) -> Result<bool, BlacklistError>;

    /// Remove `jti` from the ledger
    ///
    /// # Returns
    /// * `Ok(true)` - An entry was removed
    /// * `Ok(false)` - Nothing was stored under `jti`
    async fn delete(&self, jti: &str) -> Result<bool, BlacklistError>;

    /// Record `jti` as revoked and index it under its session `linkage`
    async fn put_with_linkage(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<(), BlacklistError>;

    /// Every revoked jti recorded under `linkage` that has not expired
    async fn exists_by_linkage(&self, linkage: &str) -> Result<HashSet<String>, BlacklistError>;

    /// Revoke a whole session so that every token carrying `linkage` is rejected
    async fn revoke_linkage(&self, linkage: &str, ttl: Duration) -> Result<(), BlacklistError>;

    /// Whether the session `linkage` has been revoked as a whole
    async fn is_linkage_revoked(&self, linkage: &str) -> Result<bool, BlacklistError>;

    /// Whether a token is revoked either by its own id or through its session
    ///
    /// Stores that can answer both questions in one round trip should override
    /// this.
    async fn is_revoked(&self, jti: &str, linkage: &str) -> Result<bool, BlacklistError> {
        if self.exists(jti).await? {
            return Ok(true);
        }
        self.is_linkage_revoked(linkage).await
    }

    /// Record `jti` only if it is not already present
    ///
    /// Returns `true` when this call inserted the entry. The default is not
    /// atomic: two callers may both observe absence and both return `true`.
    /// Stores with a compare-and-set primitive must override it.
    async fn put_if_absent(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<bool, BlacklistError> {
        if self.exists(jti).await? {
            return Ok(false);
        }
        self.put_with_linkage(jti, linkage, ttl).await?;
        Ok(true)
    }

    /// Liveness check for health reporting
    async fn ping(&self) -> Result<(), BlacklistError> {
        Ok(())
    }
}

#[async_trait]
impl<T: BlacklistStore + ?Sized> BlacklistStore for std::sync::Arc<T> {
    async fn put(&self, jti: &str, ttl: Duration) -> Result<(), BlacklistError> {
        (**self).put(jti, ttl).await
    }

    async fn exists(&self, jti: &str) -> Result<bool, BlacklistError> {
        (**self).exists(jti).await
    }

    async fn delete(&self, jti: &str) -> Result<bool, BlacklistError> {
        (**self).delete(jti).await
    }

    async fn put_with_linkage(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<(), BlacklistError> {
        (**self).put_with_linkage(jti, linkage, ttl).await
    }

    async fn exists_by_linkage(&self, linkage: &str) -> Result<HashSet<String>, BlacklistError> {
        (**self).exists_by_linkage(linkage).await
    }

    async fn revoke_linkage(&self, linkage: &str, ttl: Duration) -> Result<(), BlacklistError> {
        (**self).revoke_linkage(linkage, ttl).await
    }

    async fn is_linkage_revoked(&self, linkage: &str) -> Result<bool, BlacklistError> {
        (**self).is_linkage_revoked(linkage).await
    }

    async fn is_revoked(&self, jti: &str, linkage: &str) -> Result<bool, BlacklistError> {
        (**self).is_revoked(jti, linkage).await
    }

    async fn put_if_absent(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<bool, BlacklistError> {
        (**self).put_if_absent(jti, linkage, ttl).await
    }

    async fn ping(&self) -> Result<(), BlacklistError> {
        (**self).ping().await
    }
}
