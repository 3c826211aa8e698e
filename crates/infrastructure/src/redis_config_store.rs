//! Redis-backed config store.

use async_trait::async_trait;
use flowdash_application::{
    ConfigEntry, ConfigKey, ConfigRevision, ConfigStore, PublishPrecondition,
};
use flowdash_core::{AppError, AppResult};
use redis::{AsyncCommands, Script};
use tracing::debug;

const COMPARE_AND_SET_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], 'revision')
local mode = ARGV[1]

if mode == 'absent' and current then
  return 0
end
if mode == 'matches' and current ~= ARGV[2] then
  return 0
end

redis.call('HSET', KEYS[1], 'content', ARGV[3], 'revision', ARGV[4])
return 1
"#;

/// Redis implementation of the config store port.
///
/// Each document is a hash holding `content` and `revision`; writes run as a
/// Lua script so the precondition check and the replacement are atomic.
#[derive(Clone)]
pub struct RedisConfigStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisConfigStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &ConfigKey) -> String {
        format!("{}:{}:{}", self.key_prefix, key.group(), key.data_id())
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Store(format!("failed to connect to redis: {error}")))
    }
}

fn decode_entry(content: Option<String>, revision: Option<String>) -> Option<ConfigEntry> {
    content.map(|content| {
        let revision = revision
            .map(ConfigRevision::from_raw)
            .unwrap_or_else(|| ConfigRevision::of_content(&content));
        ConfigEntry { content, revision }
    })
}

fn precondition_args(precondition: &PublishPrecondition) -> (&'static str, &str) {
    match precondition {
        PublishPrecondition::Any => ("any", ""),
        PublishPrecondition::Absent => ("absent", ""),
        PublishPrecondition::Matches(revision) => ("matches", revision.as_str()),
    }
}

#[async_trait]
impl ConfigStore for RedisConfigStore {
    async fn read(&self, key: &ConfigKey) -> AppResult<Option<ConfigEntry>> {
        let redis_key = self.key_for(key);
        let mut connection = self.connection().await?;

        let (content, revision): (Option<String>, Option<String>) = connection
            .hmget(&redis_key, &["content", "revision"])
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to read config '{key}' from redis: {error}"))
            })?;

        Ok(decode_entry(content, revision))
    }

    async fn write(
        &self,
        key: &ConfigKey,
        content: String,
        precondition: &PublishPrecondition,
    ) -> AppResult<ConfigRevision> {
        let redis_key = self.key_for(key);
        let revision = ConfigRevision::of_content(&content);
        let (mode, expected) = precondition_args(precondition);
        let mut connection = self.connection().await?;

        let applied: i64 = Script::new(COMPARE_AND_SET_SCRIPT)
            .key(&redis_key)
            .arg(mode)
            .arg(expected)
            .arg(content)
            .arg(revision.as_str())
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to write config '{key}' to redis: {error}"))
            })?;

        if applied == 0 {
            return Err(AppError::Conflict(format!(
                "config '{key}' was modified concurrently"
            )));
        }

        debug!(config = %key, revision = revision.as_str(), "published config to redis");
        Ok(revision)
    }
}
