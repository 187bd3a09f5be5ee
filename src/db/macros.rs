/// Read-through caching helper.
///
/// Returns the cached value for `$key` when present. On a miss, or when the
/// cache itself is unreachable, awaits `$block`, queues the result for a
/// background write with `$ttl` seconds and returns it.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Feed(feed, limit), FEED_CACHE_TTL, async move {
///     self.inner.feed(feed, limit).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(key = %key, error = %e, "Cache read failed, fetching live");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
