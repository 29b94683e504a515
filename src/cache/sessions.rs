use crate::cache::CacheService;
use tracing::info;

fn revoked_key(jti: &str) -> String {
    format!("session:revoked:{jti}")
}

impl CacheService {
    /// Marks a session id as logged out until its token would have expired.
    pub async fn revoke_session(&self, jti: &str, ttl_seconds: u64) -> Result<(), redis::RedisError> {
        // at least one second so an about-to-expire token cannot slip through
        self.set_ex(&revoked_key(jti), "1", ttl_seconds.max(1)).await?;
        info!(jti, "session revoked");
        Ok(())
    }

    pub async fn is_session_revoked(&self, jti: &str) -> Result<bool, redis::RedisError> {
        Ok(self.get(&revoked_key(jti)).await?.is_some())
    }
}
