//! Redis cache client implementation
//!
//! Provides a Redis client with connect retry and a hard deadline on every
//! operation. Operations run exactly once; a failed command is reported to the
//! caller, which owns any retry policy. It exposes the primitives the
//! revocation ledger needs: expiring keys, conditional insert, multi-key
//! existence and expiring sets.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use tw_shared::CacheConfig;

use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// KEYS: value key, set key. ARGV: value, expiry seconds, set member.
const SET_IF_ABSENT_AND_INDEX: &str = r"
if not redis.call('SET', KEYS[1], ARGV[1], 'NX', 'EX', ARGV[2]) then
  return 0
end
redis.call('SADD', KEYS[2], ARGV[3])
redis.call('EXPIRE', KEYS[2], ARGV[2], 'NX')
redis.call('EXPIRE', KEYS[2], ARGV[2], 'GT')
return 1
";

/// Redis cache client with connection retry and per-operation deadlines
///
/// Cloning is cheap; all clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to Redis
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use tw_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_prefix("tw");
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            "Creating Redis client with URL: {} and operation timeout: {}ms",
            mask_url(&config.url),
            config.operation_timeout_ms
        );

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_attempts = config.connect_retries.max(1);
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let mut attempts = 0;
        let mut delay = 100;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let error = match timeout(connect_timeout, client.get_multiplexed_async_connection())
                .await
            {
                Ok(Ok(connection)) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Timeout {
                    operation: "connect",
                    timeout_ms: connect_timeout.as_millis() as u64,
                },
            };

            if attempts >= max_attempts {
                error!(
                    "Failed to connect to Redis after {} attempts: {}",
                    attempts, error
                );
                return Err(error);
            }

            warn!(
                "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                attempts, max_attempts, error, delay
            );
            sleep(Duration::from_millis(delay)).await;
            // Exponential backoff with cap at 5 seconds
            delay = (delay * 2).min(5000);
        }
    }

    /// Configuration this client was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Set a value with expiration time
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `value` - Value to store
    /// * `expiry_seconds` - Time to live in seconds
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        self.run("set_with_expiry", |mut conn| {
            let key = key.to_string();
            let value = value.to_string();

            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
    }

    /// Set a value with expiration time only if the key does not exist, and
    /// on success add `member` to the set at `set_key` with at least the same
    /// expiry, all in one script
    ///
    /// SET NX is not idempotent, so a lost reply surfaces as an error rather
    /// than being replayed into a misleading `Ok(false)`.
    ///
    /// # Returns
    /// * `Ok(true)` - The key was created by this call and indexed
    /// * `Ok(false)` - The key already existed and nothing was written
    pub async fn set_if_absent_and_index(
        &self,
        key: &str,
        value: &str,
        set_key: &str,
        member: &str,
        expiry_seconds: u64,
    ) -> Result<bool, InfrastructureError> {
        debug!("Setting key '{}' if absent with expiry {}s", key, expiry_seconds);

        let created = self
            .run("set_if_absent_and_index", |mut conn| {
                let key = key.to_string();
                let value = value.to_string();
                let set_key = set_key.to_string();
                let member = member.to_string();

                Box::pin(async move {
                    let script = redis::Script::new(SET_IF_ABSENT_AND_INDEX);
                    script
                        .key(key)
                        .key(set_key)
                        .arg(value)
                        .arg(expiry_seconds)
                        .arg(member)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await?;

        Ok(created == 1)
    }

    /// Check if a key exists in cache
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Checking if key '{}' exists", key);

        self.run("exists", |mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
    }

    /// Number of the given keys that exist, in one round trip
    pub async fn count_existing(&self, keys: &[String]) -> Result<u64, InfrastructureError> {
        if keys.is_empty() {
            return Ok(0);
        }
        debug!("Checking existence of {} keys", keys.len());

        self.run("count_existing", |mut conn| {
            let keys = keys.to_vec();

            Box::pin(async move {
                redis::cmd("EXISTS")
                    .arg(keys)
                    .query_async::<_, u64>(&mut conn)
                    .await
            })
        })
        .await
    }

    /// Existence of each key, in input order
    pub async fn exists_each(&self, keys: &[String]) -> Result<Vec<bool>, InfrastructureError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        self.run("exists_each", |mut conn| {
            let keys = keys.to_vec();

            Box::pin(async move {
                let mut pipe = redis::pipe();
                for key in &keys {
                    pipe.cmd("EXISTS").arg(key);
                }
                pipe.query_async::<_, Vec<bool>>(&mut conn).await
            })
        })
        .await
    }

    /// Delete a key from cache
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key was deleted, false if not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        let deleted_count = self
            .run("delete", |mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await?;

        Ok(deleted_count > 0)
    }

    /// Add `member` to the set at `key` and make the set live at least
    /// `expiry_seconds`, never shortening an existing expiry
    pub async fn add_to_set_with_min_expiry(
        &self,
        key: &str,
        member: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Adding member to set '{}' with expiry {}s", key, expiry_seconds);

        self.run("add_to_set_with_min_expiry", |mut conn| {
            let key = key.to_string();
            let member = member.to_string();

            Box::pin(async move {
                redis::pipe()
                    .atomic()
                    .cmd("SADD")
                    .arg(&key)
                    .arg(&member)
                    .ignore()
                    .cmd("EXPIRE")
                    .arg(&key)
                    .arg(expiry_seconds)
                    .arg("NX")
                    .ignore()
                    .cmd("EXPIRE")
                    .arg(&key)
                    .arg(expiry_seconds)
                    .arg("GT")
                    .ignore()
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
    }

    /// Members of the set at `key`
    pub async fn set_members(&self, key: &str) -> Result<HashSet<String>, InfrastructureError> {
        debug!("Reading members of set '{}'", key);

        self.run("set_members", |mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.smembers::<_, HashSet<String>>(key).await })
        })
        .await
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Result<Option<i64>, InfrastructureError>` - TTL in seconds, None if key doesn't exist or has no expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let ttl = self
            .run("ttl", |mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await?;

        Ok((ttl >= 0).then_some(ttl))
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let response = self
            .run("ping", |mut conn| {
                Box::pin(async move {
                    redis::cmd("PING").query_async::<_, String>(&mut conn).await
                })
            })
            .await?;

        if response == "PONG" {
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    /// Run an operation once under the configured deadline
    async fn run<F, T>(&self, operation: &'static str, op: F) -> Result<T, InfrastructureError>
    where
        F: FnOnce(MultiplexedConnection) -> RedisFuture<T>,
    {
        run_with_deadline(
            operation,
            self.config.operation_timeout(),
            op(self.connection.clone()),
        )
        .await
    }
}

/// Await a single Redis call, mapping its error and the deadline
pub(crate) async fn run_with_deadline<T>(
    operation: &'static str,
    deadline: Duration,
    call: RedisFuture<T>,
) -> Result<T, InfrastructureError> {
    match timeout(deadline, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            if is_retriable_error(&e) {
                warn!("Redis operation {} failed with a transient error: {}", operation, e);
            } else {
                error!("Redis operation {} failed: {}", operation, e);
            }
            Err(InfrastructureError::Cache(e))
        }
        Err(_) => {
            warn!(
                "Redis operation {} exceeded {}ms",
                operation,
                deadline.as_millis()
            );
            Err(InfrastructureError::Timeout {
                operation,
                timeout_ms: deadline.as_millis() as u64,
            })
        }
    }
}

/// Check if a Redis error is transient, so a caller may choose to retry
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
