use crate::cache::CacheService;

impl CacheService {
    /// Cached JSON body of a venue search, if still fresh.
    pub async fn get_cached_search(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        self.get(key).await
    }

    pub async fn cache_search_result(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), redis::RedisError> {
        self.set_ex(key, value, ttl_seconds).await
    }
}

/// Cache key for one combination of search inputs.
///
/// The cached body carries distances, so the observer is keyed exactly: two
/// observers share an entry only when their coordinates are identical.
pub fn search_cache_key(
    query: &str,
    time_filter: Option<&str>,
    observer: Option<(f64, f64)>,
) -> String {
    let origin = observer.map_or_else(
        || "none".to_string(),
        |(lat, lng)| format!("{lat},{lng}"),
    );
    format!(
        "search:venues:q={}&time={}&origin={}",
        query.to_lowercase(),
        time_filter.unwrap_or_default(),
        origin
    )
}
