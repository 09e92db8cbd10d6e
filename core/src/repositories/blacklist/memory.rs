//! Process-local blacklist store
//!
//! Suitable for tests and single-instance deployments. Revocations do not
//! survive a restart and are not shared between replicas. Expired entries are
//! swept by writes, so the ledger stays bounded by the live revocations plus
//! one purge interval of expired ones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::errors::BlacklistError;
use crate::services::token::clock::{ClockSource, SystemClock};

use super::r#trait::BlacklistStore;

/// Expired entries are swept during a write at most this often
const PURGE_INTERVAL_SECONDS: i64 = 60;

#[derive(Default)]
struct Ledger {
    /// jti -> expiry
    revoked: HashMap<String, DateTime<Utc>>,
    /// linkage -> expiry of the session-wide marker
    sessions: HashMap<String, DateTime<Utc>>,
    /// linkage -> jtis revoked under it
    index: HashMap<String, HashSet<String>>,
    /// Earliest time the next write sweeps expired entries
    next_purge: Option<DateTime<Utc>>,
}

impl Ledger {
    fn insert(&mut self, jti: &str, linkage: Option<&str>, expires_at: DateTime<Utc>) {
        self.revoked.insert(jti.to_string(), expires_at);
        if let Some(linkage) = linkage {
            self.index
                .entry(linkage.to_string())
                .or_default()
                .insert(jti.to_string());
        }
    }

    fn is_live(&self, jti: &str, now: DateTime<Utc>) -> bool {
        self.revoked.get(jti).is_some_and(|expires_at| *expires_at > now)
    }

    /// Sweep on a write once the purge interval has passed
    fn purge_due(&mut self, now: DateTime<Utc>) {
        match self.next_purge {
            Some(due) if now < due => {}
            Some(_) => self.purge(now),
            None => self.schedule_purge(now),
        }
    }

    fn schedule_purge(&mut self, now: DateTime<Utc>) {
        self.next_purge = Some(now + chrono::Duration::seconds(PURGE_INTERVAL_SECONDS));
    }

    fn purge(&mut self, now: DateTime<Utc>) {
        self.schedule_purge(now);
        self.revoked.retain(|_, expires_at| *expires_at > now);
        self.sessions.retain(|_, expires_at| *expires_at > now);
        let revoked = &self.revoked;
        self.index.retain(|_, jtis| {
            jtis.retain(|jti| revoked.contains_key(jti));
            !jtis.is_empty()
        });
    }
}

/// In-memory blacklist keyed by jti, with a per-session index
pub struct InMemoryBlacklistStore {
    ledger: RwLock<Ledger>,
    clock: Arc<dyn ClockSource>,
}

impl InMemoryBlacklistStore {
    /// Create a store that reads time from the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store that reads time from `clock`
    pub fn with_clock(clock: Arc<dyn ClockSource>) -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            clock,
        }
    }

    /// Number of jti entries that have not expired
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let ledger = self.ledger.read().await;
        ledger.revoked.values().filter(|exp| **exp > now).count()
    }

    /// Whether no unexpired jti entries exist
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired entry
    pub async fn purge_expired(&self) {
        let now = self.clock.now();
        self.ledger.write().await.purge(now);
    }

    /// Stored jti entries and index memberships, expired ones included
    #[cfg(test)]
    pub(crate) async fn footprint(&self) -> (usize, usize) {
        let ledger = self.ledger.read().await;
        let indexed = ledger.index.values().map(HashSet::len).sum();
        (ledger.revoked.len(), indexed)
    }

    fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
        self.clock.now() + chrono::Duration::milliseconds(ttl.as_millis() as i64)
    }
}

impl Default for InMemoryBlacklistStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlacklistStore for InMemoryBlacklistStore {
    async fn put(&self, jti: &str, ttl: Duration) -> Result<(), BlacklistError> {
        let now = self.clock.now();
        let expires_at = self.expiry(ttl);
        let mut ledger = self.ledger.write().await;
        ledger.purge_due(now);
        ledger.insert(jti, None, expires_at);
        Ok(())
    }

    async fn exists(&self, jti: &str) -> Result<bool, BlacklistError> {
        let now = self.clock.now();
        Ok(self.ledger.read().await.is_live(jti, now))
    }

    async fn delete(&self, jti: &str) -> Result<bool, BlacklistError> {
        let now = self.clock.now();
        let mut ledger = self.ledger.write().await;
        let was_live = ledger.is_live(jti, now);
        ledger.revoked.remove(jti);
        for jtis in ledger.index.values_mut() {
            jtis.remove(jti);
        }
        Ok(was_live)
    }

    async fn put_with_linkage(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<(), BlacklistError> {
        let now = self.clock.now();
        let expires_at = self.expiry(ttl);
        let mut ledger = self.ledger.write().await;
        ledger.purge_due(now);
        ledger.insert(jti, Some(linkage), expires_at);
        Ok(())
    }

    async fn exists_by_linkage(&self, linkage: &str) -> Result<HashSet<String>, BlacklistError> {
        let now = self.clock.now();
        let ledger = self.ledger.read().await;
        Ok(ledger
            .index
            .get(linkage)
            .map(|jtis| {
                jtis.iter()
                    .filter(|jti| ledger.is_live(jti, now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn revoke_linkage(&self, linkage: &str, ttl: Duration) -> Result<(), BlacklistError> {
        let now = self.clock.now();
        let expires_at = self.expiry(ttl);
        let mut ledger = self.ledger.write().await;
        ledger.purge_due(now);
        let current = ledger.sessions.entry(linkage.to_string()).or_insert(expires_at);
        if expires_at > *current {
            *current = expires_at;
        }
        Ok(())
    }

    async fn is_linkage_revoked(&self, linkage: &str) -> Result<bool, BlacklistError> {
        let now = self.clock.now();
        let ledger = self.ledger.read().await;
        Ok(ledger
            .sessions
            .get(linkage)
            .is_some_and(|expires_at| *expires_at > now))
    }

    async fn is_revoked(&self, jti: &str, linkage: &str) -> Result<bool, BlacklistError> {
        let now = self.clock.now();
        let ledger = self.ledger.read().await;
        let session_revoked = ledger
            .sessions
            .get(linkage)
            .is_some_and(|expires_at| *expires_at > now);
        Ok(session_revoked || ledger.is_live(jti, now))
    }

    async fn put_if_absent(
        &self,
        jti: &str,
        linkage: &str,
        ttl: Duration,
    ) -> Result<bool, BlacklistError> {
        let now = self.clock.now();
        let expires_at = self.expiry(ttl);
        let mut ledger = self.ledger.write().await;
        ledger.purge_due(now);
        if ledger.is_live(jti, now) {
            return Ok(false);
        }
        ledger.insert(jti, Some(linkage), expires_at);
        Ok(true)
    }
}
