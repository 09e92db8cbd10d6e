//! Redis-backed revocation ledger
//!
//! Key layout (after the configured prefix):
//!
//! - `blacklist:jti:{jti}` - one string per revoked token, expiring with it
//! - `blacklist:sid:{sid}` - session-wide revocation marker
//! - `blacklist:sid:{sid}:jtis` - set of jtis revoked under a session, kept
//!   alive as long as its longest-lived member

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use tw_core::errors::BlacklistError;
use tw_core::repositories::BlacklistStore;
use tw_shared::CacheConfig;

use super::redis_client::RedisClient;

const REVOKED_MARKER: &str = "1";

/// `BlacklistStore` over Redis
#[derive(Clone)]
pub struct RedisBlacklistStore {
    client: RedisClient,
}

impl RedisBlacklistStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn jti_key(&self, jti: &str) -> String {
        jti_key(self.client.config(), jti)
    }

    fn session_key(&self, linkage: &str) -> String {
        session_key(self.client.config(), linkage)
    }

    fn index_key(&self, linkage: &str) -> String {
        index_key(self.client.config(), linkage)
    }

    async fn index(&self, jti: &str, linkage: &str, seconds: u64) -> Result<(), BlacklistError> {
        self.client
            .add_to_set_with_min_expiry(&self.index_key(linkage), jti, seconds)
            .await?;
        Ok(())
    }
}

pub(crate) fn jti_key(config: &CacheConfig, jti: &str) -> String {
    config.make_key(&format!("blacklist:jti:{}", jti))
}

pub(crate) fn session_key(config: &CacheConfig, linkage: &str) -> String {
    config.make_key(&format!("blacklist:sid:{}", linkage))
}

pub(crate) fn index_key(config: &CacheConfig, linkage: &str) -> String {
    config.make_key(&format!("blacklist:sid:{}:jtis", linkage))
}

/// Whole seconds covering `ttl`, never less than one
pub(crate) fn ttl_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    seconds.max(1)
}

#[async_trait]
impl BlacklistStore for RedisBlacklistStore {
    async fn put(&self, jti: &str, ttl: Duration) -> Result<(), BlacklistError> {
        self.client
            .set_with_expiry(&self.jti_key(jti), REVOKED_MARKER, ttl_seconds(ttl))
            .await?;
        Ok(())
    }

    async fn exists(&self, jti: &str) -> Result<bool, BlacklistError> {
        Ok(self.client.exists(&self.jti_key(jti)).await?)
    }

    async fn delete(&self, jti: &str) -> Result<bool, BlacklistError> {
        Ok(self.client.delete(&self.jti_key(jti)).await?)
    }

    async fn put_with_linkage(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<(), BlacklistError> {
        let seconds = ttl_seconds(ttl);
        self.client
            .set_with_expiry(&self.jti_key(jti), REVOKED_MARKER, seconds)
            .await?;
        self.index(jti, linkage, seconds).await
    }

    async fn exists_by_linkage(&self, linkage: &str) -> Result<HashSet<String>, BlacklistError> {
        let members: Vec<String> = self
            .client
            .set_members(&self.index_key(linkage))
            .await?
            .into_iter()
            .collect();

        let keys: Vec<String> = members.iter().map(|jti| self.jti_key(jti)).collect();
        let live = self.client.exists_each(&keys).await?;

        debug!(sid = %linkage, indexed = members.len(), "Read session revocation index");

        Ok(members
            .into_iter()
            .zip(live)
            .filter_map(|(jti, live)| live.then_some(jti))
            .collect())
    }

    async fn revoke_linkage(&self, linkage: &str, ttl: Duration) -> Result<(), BlacklistError> {
        self.client
            .set_with_expiry(&self.session_key(linkage), REVOKED_MARKER, ttl_seconds(ttl))
            .await?;
        Ok(())
    }

    async fn is_linkage_revoked(&self, linkage: &str) -> Result<bool, BlacklistError> {
        Ok(self.client.exists(&self.session_key(linkage)).await?)
    }

    async fn is_revoked(&self, jti: &str, linkage: &str) -> Result<bool, BlacklistError> {
        let keys = [self.jti_key(jti), self.session_key(linkage)];
        Ok(self.client.count_existing(&keys).await? > 0)
    }

    async fn put_if_absent(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<bool, BlacklistError> {
        Ok(self
            .client
            .set_if_absent_and_index(
                &self.jti_key(jti),
                REVOKED_MARKER,
                &self.index_key(linkage),
                jti,
                ttl_seconds(ttl),
            )
            .await?)
    }

    async fn ping(&self) -> Result<(), BlacklistError> {
        if self.client.health_check().await? {
            Ok(())
        } else {
            Err(BlacklistError::Unavailable {
                message: "unexpected PING reply".to_string(),
            })
        }
    }
}
