use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::redis_client::RedisClient;

pub mod auth;

/// Хранилище ключ-значение с TTL: Redis в проде, [`MemoryCache`] в тестах.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> redis::RedisResult<Option<String>>;
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> redis::RedisResult<()>;
}

#[async_trait]
impl CacheBackend for RedisClient {
    async fn get(&self, key: &str) -> redis::RedisResult<Option<String>> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> redis::RedisResult<()> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        conn.set_ex(key, value, ttl_seconds).await
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.values().filter(|(_, deadline)| *deadline > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, deadline)| *deadline > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> redis::RedisResult<()> {
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }
}

/// Кеш проверенных Basic credentials. Роль и активность пользователя сюда
/// не попадают, остаток мест и списки сеансов тоже не кешируются.
#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
    auth_ttl_seconds: u64,
}

impl CacheService {
    pub fn new(backend: Arc<dyn CacheBackend>, auth_ttl_seconds: u64) -> Self {
        Self { backend, auth_ttl_seconds }
    }
}
