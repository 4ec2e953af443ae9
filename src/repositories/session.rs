use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::{
    error::{AppError, Result},
    models::session::SessionRecord,
    repositories::traits::SessionStore,
};

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Session store holding JSON records in Redis with a sliding TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>> {
        let mut redis = self.redis.clone();
        let raw: Option<String> = redis.get(session_key(token)).await?;

        raw.map(|json| {
            sonic_rs::from_str::<SessionRecord>(&json)
                .map_err(|e| AppError::Serialization(format!("Invalid session JSON: {}", e)))
        })
        .transpose()
    }

    async fn save(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<()> {
        let session_json = sonic_rs::to_string(record)
            .map_err(|e| AppError::Serialization(format!("Session serialization failed: {}", e)))?;

        let mut redis = self.redis.clone();
        let _: () = redis
            .set_ex(session_key(token), &session_json, ttl.as_secs().max(1))
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis set_ex failed: {}", e);
                AppError::Redis(e)
            })?;
        Ok(())
    }

    async fn update(&self, token: &str, record: &SessionRecord, ttl: Duration) -> Result<bool> {
        let session_json = sonic_rs::to_string(record)
            .map_err(|e| AppError::Serialization(format!("Session serialization failed: {}", e)))?;

        let mut redis = self.redis.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(session_key(token))
            .arg(&session_json)
            .arg("XX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut redis)
            .await?;
        Ok(reply.is_some())
    }

    async fn touch(&self, token: &str, ttl: Duration) -> Result<()> {
        let mut redis = self.redis.clone();
        let seconds = i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX);
        let _: () = redis.expire(session_key(token), seconds).await?;
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(session_key(token)).await?;
        Ok(())
    }
}
