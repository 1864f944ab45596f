use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

use std::{sync::Arc, time::Duration};

use super::{RecordStore, StorageError};

const SCAN_BATCH: usize = 100;

#[derive(Clone)]
pub struct RedisStore {
    inner: Arc<Client>,
}

impl RedisStore {
    pub fn open(url: &str) -> Result<Self, StorageError> {
        let client = Client::open(url)?;
        Ok(Self {
            inner: Arc::new(client),
        })
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection, StorageError> {
        let conn = self.inner.get_multiplexed_async_connection().await?;
        Ok(conn)
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong != "PONG" {
            return Err(StorageError::Redis("Redis connection test failed".to_string()));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        if let Some(ttl) = ttl {
            conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        } else {
            conn.set::<_, _, ()>(key, value).await?;
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut conn = self.get_connection().await?;
        let pattern = format!("{}*", prefix);

        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }
}
