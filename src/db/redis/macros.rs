/// Read-through caching over [`crate::db::Cache`].
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for storage with the given TTL (seconds) and returns it.
/// A failed cache read is logged and treated as a miss.
/// Must be used inside a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// let path: Option<String> = cached!(cache, CacheKey::PosterPath(id), TTL, async move {
///     fetch_poster_path(id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                None
            }
        };

        if let Some(cached) = hit {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
