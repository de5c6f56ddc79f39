//! Redis-backed [`KeyValueStore`].

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult, Script};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, instrument, warn};

use super::error::{Error, Result};
use super::store::KeyValueStore;

const CONNECT_ATTEMPTS: u32 = 3;

// GET + DEL in one server-side step so two redeemers cannot both see the code.
const COMPARE_AND_DELETE: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
";

pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
    compare_and_delete: Script,
}

impl RedisStore {
    /// Connect to Redis, retrying with exponential backoff.
    ///
    /// # Errors
    /// Returns the last connection error once all attempts are exhausted.
    #[instrument(skip(url))]
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)?;

        let mut attempt = 1;
        let conn = loop {
            let result = match timeout(op_timeout, ConnectionManager::new(client.clone())).await {
                Ok(result) => result.map_err(Error::from),
                Err(_) => Err(Error::Timeout(op_timeout)),
            };

            match result {
                Ok(conn) => break conn,
                Err(err) if attempt < CONNECT_ATTEMPTS => {
                    let backoff_time = 2u64.pow(attempt - 1);
                    warn!("Redis connection attempt {attempt} failed: {err}, backing off for {backoff_time} seconds");
                    sleep(Duration::from_secs(backoff_time)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        debug!("connected to redis");

        Ok(Self {
            conn,
            op_timeout,
            compare_and_delete: Script::new(COMPARE_AND_DELETE),
        })
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.op_timeout, op).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded(conn.get(key)).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        self.bounded(conn.set_ex::<_, _, ()>(key, value, seconds))
            .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded(conn.del::<_, ()>(key)).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let deleted: i64 = self
            .bounded(
                self.compare_and_delete
                    .key(key)
                    .arg(expected)
                    .invoke_async(&mut conn),
            )
            .await?;
        Ok(deleted == 1)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let pong: String = self
            .bounded(redis::cmd("PING").query_async(&mut conn))
            .await?;
        debug!("redis ping: {pong}");
        Ok(())
    }
}
