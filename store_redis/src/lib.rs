//! # Redis
//!
//! Network backend for the cache stores.
//!
//! Counters are plain string keys driven by `INCRBY`/`GET`; ranked sets are
//! Redis sorted sets driven by `ZINCRBY`/`ZRANGE`/`ZREVRANGE`. Redis queues
//! commands on a single thread, so every increment is atomic without any
//! client-side locking.
//!
//! ## Connection
//!
//! One [`ConnectionManager`] is shared by every request. It multiplexes
//! commands over a single connection and reconnects in the background, so
//! cloning it per call is cheap.
//!
//! ## Failure mapping
//!
//! Connection drops, timeouts and refused connections map to
//! [`StoreError::Unavailable`]; anything else is [`StoreError::Backend`].

pub mod error;

pub use error::RedisStoreError;

use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    Client,
};
use tally_store::{CounterStore, RankedMember, RankedSetStore, StoreError};
use tracing::{debug, info};

/// Counters and ranked sets stored in one Redis database.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: ConnectionManager,
}

impl RedisCacheStore {
    /// Connect to `redis_url` and verify the server answers `PING`.
    pub async fn connect(redis_url: &str) -> Result<Self, RedisStoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(100));

        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager_with_config(config).await?;

        let store = Self { connection };
        store.ping().await?;
        info!("Connected to Redis at {redis_url}");
        Ok(store)
    }

    async fn ping(&self) -> Result<(), RedisStoreError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn range(
        &self,
        command: &str,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError> {
        if start > stop {
            return Ok(Vec::new());
        }
        let mut conn = self.connection.clone();
        let rows: Vec<(String, f64)> = redis::cmd(command)
            .arg(set)
            .arg(start)
            .arg(stop)
            .arg("WITHSCORES")
            .query_async(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;
        Ok(rows
            .into_iter()
            .map(|(member, score)| RankedMember::new(member, score_to_u64(score)))
            .collect())
    }
}

/// Sorted-set scores are doubles on the wire; vote scores are whole numbers.
fn score_to_u64(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        score.round() as u64
    } else {
        0
    }
}

#[async_trait]
impl CounterStore for RedisCacheStore {
    async fn increment(&self, key: &str, delta: u64) -> Result<u64, StoreError> {
        let mut conn = self.connection.clone();
        let value: u64 = redis::cmd("INCRBY")
            .arg(key)
            .arg(delta)
            .query_async(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;
        Ok(value)
    }

    async fn get(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection.clone();
        let value: Option<u64> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;
        Ok(value.unwrap_or(0))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        flush_db(&self.connection).await
    }
}

#[async_trait]
impl RankedSetStore for RedisCacheStore {
    async fn increment_score(
        &self,
        set: &str,
        member: &str,
        delta: u64,
    ) -> Result<u64, StoreError> {
        let mut conn = self.connection.clone();
        let score: f64 = redis::cmd("ZINCRBY")
            .arg(set)
            .arg(delta)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(RedisStoreError::from)?;
        Ok(score_to_u64(score))
    }

    async fn range_by_rank_desc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError> {
        self.range("ZREVRANGE", set, start, stop).await
    }

    async fn range_by_rank_asc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError> {
        self.range("ZRANGE", set, start, stop).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        flush_db(&self.connection).await
    }
}

/// Counters and sets share the database, so clearing either clears both.
async fn flush_db(connection: &ConnectionManager) -> Result<(), StoreError> {
    let mut conn = connection.clone();
    let _: () = redis::cmd("FLUSHDB")
        .query_async(&mut conn)
        .await
        .map_err(RedisStoreError::from)?;
    debug!("Flushed Redis database");
    Ok(())
}
