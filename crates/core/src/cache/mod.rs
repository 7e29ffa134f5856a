use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_TTL_SECS: u64 = 15 * 60;

#[derive(Debug, Clone)]
struct Entry<V> {
    inserted_at: Instant,
    payload: V,
}

/// Process-wide TTL-bound key/value cache shared by all verification
/// lookups. Entries are never swept proactively; validity is reassessed
/// on every read and stale entries are dropped then. At most one entry
/// per key; `put` overwrites under last-write-wins.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_env() -> Self {
        let ttl_secs = std::env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TTL_SECS);
        Self::new(Duration::from_secs(ttl_secs))
    }

    /// Returns the payload while the entry's age is within the TTL;
    /// otherwise removes the entry (if present) and reports a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now()).await
    }

    /// Insert or overwrite with the current timestamp.
    pub async fn put(&self, key: &str, payload: V) {
        self.put_at(key, payload, Instant::now()).await;
    }

    /// `get` against an explicit clock reading, so tests can drive
    /// expiry without waiting out the TTL.
    pub async fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) > self.ttl {
            entries.remove(key);
            return None;
        }
        Some(entry.payload.clone())
    }

    /// `put` against an explicit clock reading.
    pub async fn put_at(&self, key: &str, payload: V, now: Instant) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                inserted_at: now,
                payload,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(900));
        cache.put("symbol:NVDA", "payload".to_string()).await;
        assert_eq!(cache.get("symbol:NVDA").await.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn expired_entries_miss_and_are_removed_on_read() {
        let cache = TtlCache::new(Duration::from_secs(900));
        let t0 = Instant::now();
        cache.put_at("k", 1u32, t0).await;

        // Exactly at the TTL the entry is still valid.
        let at_ttl = t0 + Duration::from_secs(900);
        assert_eq!(cache.get_at("k", at_ttl).await, Some(1));

        let past_ttl = t0 + Duration::from_secs(901);
        assert_eq!(cache.get_at("k", past_ttl).await, None);
        // Entry is gone, not just hidden.
        assert_eq!(cache.entries.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn put_overwrites_with_fresh_timestamp() {
        let cache = TtlCache::new(Duration::from_secs(900));
        let t0 = Instant::now();
        cache.put_at("k", 1u32, t0).await;
        cache.put_at("k", 2u32, t0 + Duration::from_secs(899)).await;

        // The overwrite reset the clock, so the entry survives past the
        // original insertion's expiry.
        let now = t0 + Duration::from_secs(1200);
        assert_eq!(cache.get_at("k", now).await, Some(2));
    }

    #[tokio::test]
    async fn missing_key_is_a_miss() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(900));
        assert_eq!(cache.get("absent").await, None);
    }
}
