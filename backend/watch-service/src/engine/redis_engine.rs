use super::{ConditionalAdd, WatchEngine};
use crate::config::RedisConfig;
use crate::error::EngineError;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError, Script};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Membership check first, then the cardinality gate, then the add.
///
/// KEYS[1] = set key, ARGV[1] = member, ARGV[2] = limit.
/// Replies 0 = added, 1 = already a member, 2 = limit reached.
pub const CONDITIONAL_ADD_SCRIPT: &str = r#"
if redis.call('SISMEMBER', KEYS[1], ARGV[1]) == 1 then
    return 1
end
if redis.call('SCARD', KEYS[1]) >= tonumber(ARGV[2]) then
    return 2
end
redis.call('SADD', KEYS[1], ARGV[1])
return 0
"#;

/// Redis-backed engine. Cloning shares the underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisWatchEngine {
    conn: ConnectionManager,
    conditional_add: Script,
    command_timeout: Duration,
}

impl RedisWatchEngine {
    pub fn new(conn: ConnectionManager, command_timeout: Duration) -> Self {
        Self {
            conn,
            conditional_add: Script::new(CONDITIONAL_ADD_SCRIPT),
            command_timeout,
        }
    }

    /// Open a managed connection and verify the server answers.
    pub async fn connect(config: &RedisConfig) -> Result<Self, EngineError> {
        let client = Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        let engine = Self::new(conn, config.command_timeout());
        engine.ping().await?;
        info!(
            timeout_ms = config.command_timeout_ms,
            "Redis watch engine connected"
        );
        Ok(engine)
    }

    async fn run_with_timeout<F, T>(&self, future: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match timeout(self.command_timeout, future).await {
            Ok(res) => res.map_err(EngineError::from),
            Err(_) => Err(EngineError::Timeout(self.command_timeout)),
        }
    }
}

#[async_trait]
impl WatchEngine for RedisWatchEngine {
    async fn members(&self, key: &str) -> Result<Vec<String>, EngineError> {
        let mut conn = self.conn.clone();
        self.run_with_timeout(
            redis::cmd("SMEMBERS")
                .arg(key)
                .query_async::<_, Vec<String>>(&mut conn),
        )
        .await
    }

    async fn remove(&self, key: &str, member: &str) -> Result<(), EngineError> {
        let mut conn = self.conn.clone();
        let removed: i64 = self
            .run_with_timeout(
                redis::cmd("SREM")
                    .arg(key)
                    .arg(member)
                    .query_async(&mut conn),
            )
            .await?;
        debug!(%key, %member, removed, "SREM");
        Ok(())
    }

    async fn conditional_add(
        &self,
        key: &str,
        member: &str,
        limit: usize,
    ) -> Result<ConditionalAdd, EngineError> {
        let mut conn = self.conn.clone();
        let reply: i64 = self
            .run_with_timeout(
                self.conditional_add
                    .key(key)
                    .arg(member)
                    .arg(limit)
                    .invoke_async::<_, i64>(&mut conn),
            )
            .await?;
        ConditionalAdd::from_reply(reply)
    }

    async fn ping(&self) -> Result<(), EngineError> {
        let mut conn = self.conn.clone();
        let pong: String = self
            .run_with_timeout(redis::cmd("PING").query_async(&mut conn))
            .await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(EngineError::UnexpectedReply(format!("PING returned {pong}")))
        }
    }
}
