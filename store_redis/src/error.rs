use redis::RedisError;
use tally_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedisStoreError {
    #[error("Redis connection error: {0}")]
    Connection(String),

    #[error("Redis error: {0}")]
    Command(String),
}

impl From<RedisError> for RedisStoreError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
        {
            RedisStoreError::Connection(e.to_string())
        } else {
            RedisStoreError::Command(e.to_string())
        }
    }
}

impl From<RedisStoreError> for StoreError {
    fn from(e: RedisStoreError) -> Self {
        match e {
            RedisStoreError::Connection(_) => StoreError::Unavailable(e.to_string()),
            RedisStoreError::Command(_) => StoreError::Backend(e.to_string()),
        }
    }
}
