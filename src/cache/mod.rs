//! Short-lived key/value storage for search results and revoked sessions.
//!
//! Backed by Redis when `REDIS_URL` is set, otherwise by a process-local map.
//! Cache failures never fail a request: callers log and carry on.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::Mutex;

pub mod search;
pub mod sessions;

#[derive(Clone)]
enum Backend {
    // the connection manager reconnects on its own
    Redis(ConnectionManager),
    Memory(Arc<Mutex<HashMap<String, (String, Instant)>>>),
}

#[derive(Clone)]
pub struct CacheService {
    backend: Backend,
}

impl CacheService {
    pub async fn connect_redis(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            backend: Backend::Redis(conn),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::default()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Redis(_) => "redis",
            Backend::Memory(_) => "memory",
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                conn.get(key).await
            }
            Backend::Memory(map) => {
                let mut map = map.lock().await;
                let now = Instant::now();
                if matches!(map.get(key), Some((_, expires_at)) if *expires_at <= now) {
                    map.remove(key);
                    return Ok(None);
                }
                Ok(map.get(key).map(|(value, _)| value.clone()))
            }
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), redis::RedisError> {
        if ttl_seconds == 0 {
            return Ok(());
        }
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                conn.set_ex(key, value, ttl_seconds).await
            }
            Backend::Memory(map) => {
                let mut map = map.lock().await;
                let now = Instant::now();
                map.retain(|_, (_, expires_at)| *expires_at > now);
                map.insert(
                    key.to_string(),
                    (value.to_string(), now + Duration::from_secs(ttl_seconds)),
                );
                Ok(())
            }
        }
    }
}
