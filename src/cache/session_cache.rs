//! Sesiones de diálogo
//!
//! Guarda el prompt pendiente de cada chat (por ejemplo después de `/driver`
//! el siguiente mensaje es el nombre a registrar). El estado vive en memoria
//! o en Redis cuando `REDIS_URL` está configurado.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheOperations, RedisClient};

/// Lo que espera el bot como siguiente mensaje del chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPrompt {
    DriverName,
    PassengerName,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set_pending(&self, tenant_id: i64, prompt: PendingPrompt) -> Result<()>;

    /// Devuelve y borra el prompt pendiente
    async fn take_pending(&self, tenant_id: i64) -> Result<Option<PendingPrompt>>;

    async fn clear(&self, tenant_id: i64) -> Result<()>;
}

/// Sesiones en memoria con expiración
pub struct MemorySessionStore {
    ttl: Duration,
    entries: RwLock<HashMap<i64, (PendingPrompt, Instant)>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set_pending(&self, tenant_id: i64, prompt: PendingPrompt) -> Result<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, created)| now.duration_since(*created) < self.ttl);
        entries.insert(tenant_id, (prompt, now));
        debug!("💬 Prompt {:?} pendiente para {}", prompt, tenant_id);
        Ok(())
    }

    async fn take_pending(&self, tenant_id: i64) -> Result<Option<PendingPrompt>> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(&tenant_id)
            .filter(|(_, created)| created.elapsed() < self.ttl)
            .map(|(prompt, _)| prompt))
    }

    async fn clear(&self, tenant_id: i64) -> Result<()> {
        self.entries.write().await.remove(&tenant_id);
        Ok(())
    }
}

/// Sesiones en Redis (`SET EX` + `GETDEL`)
pub struct RedisSessionStore {
    redis: RedisClient,
}

impl RedisSessionStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set_pending(&self, tenant_id: i64, prompt: PendingPrompt) -> Result<()> {
        let key = self.redis.session_key(tenant_id);
        self.redis.set(&key, &prompt, self.redis.default_ttl()).await
    }

    async fn take_pending(&self, tenant_id: i64) -> Result<Option<PendingPrompt>> {
        let key = self.redis.session_key(tenant_id);
        self.redis.take(&key).await
    }

    async fn clear(&self, tenant_id: i64) -> Result<()> {
        let key = self.redis.session_key(tenant_id);
        self.redis.delete(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_prompt_is_consumed_once() {
        let sessions = MemorySessionStore::new(Duration::from_secs(60));

        sessions.set_pending(1, PendingPrompt::DriverName).await.unwrap();
        assert_eq!(sessions.take_pending(2).await.unwrap(), None);
        assert_eq!(sessions.take_pending(1).await.unwrap(), Some(PendingPrompt::DriverName));
        assert_eq!(sessions.take_pending(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_latest_prompt_wins_and_clear() {
        let sessions = MemorySessionStore::new(Duration::from_secs(60));

        sessions.set_pending(1, PendingPrompt::DriverName).await.unwrap();
        sessions.set_pending(1, PendingPrompt::PassengerName).await.unwrap();
        assert_eq!(sessions.take_pending(1).await.unwrap(), Some(PendingPrompt::PassengerName));

        sessions.set_pending(1, PendingPrompt::DriverName).await.unwrap();
        sessions.clear(1).await.unwrap();
        assert_eq!(sessions.take_pending(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_prompt_is_ignored() {
        let sessions = MemorySessionStore::new(Duration::from_millis(10));

        sessions.set_pending(1, PendingPrompt::DriverName).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(sessions.take_pending(1).await.unwrap(), None);
    }

    #[test]
    fn test_prompt_serializes_as_snake_case() {
        let json = serde_json::to_string(&PendingPrompt::PassengerName).unwrap();
        assert_eq!(json, "\"passenger_name\"");
    }
}
