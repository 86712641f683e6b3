//! In-memory boundary cache with single-flight fetches.
//!
//! Entries are keyed by [`BoundaryKey`] and live for the whole session; no
//! TTL and no eviction. Concurrent requests for an absent key await a single
//! fetch instead of each issuing their own. A failed fetch leaves the entry
//! absent so a user-triggered retry of the same action fetches again.

use dashmap::DashMap;
use geojson::FeatureCollection;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::debug;

use super::source::BoundarySource;
use super::types::{BoundaryError, BoundaryKey, CacheStats};

/// Session-scoped boundary cache.
#[derive(Default)]
pub struct BoundaryCache {
    entries: DashMap<BoundaryKey, Arc<OnceCell<Arc<FeatureCollection>>>>,
    stats: Mutex<CacheStats>,
}

impl BoundaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key without fetching.
    pub fn get(&self, key: &BoundaryKey) -> Option<Arc<FeatureCollection>> {
        self.entries
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Whether a key has resolved data in the cache.
    pub fn contains(&self, key: &BoundaryKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the data for a key, fetching it from `source` on first use.
    ///
    /// At most one fetch per key is in flight at any time; concurrent
    /// callers await the winner's result. On failure the entry stays absent
    /// and the error is returned to the caller that observed it.
    pub async fn get_or_fetch<S: BoundarySource>(
        &self,
        key: &BoundaryKey,
        source: &S,
    ) -> Result<Arc<FeatureCollection>, BoundaryError> {
        let cell = self
            .entries
            .entry(key.clone())
            .or_default()
            .clone();

        if let Some(data) = cell.get() {
            debug!(key = %key, "Boundary cache hit");
            self.with_stats(|s| s.record_hit());
            return Ok(data.clone());
        }

        self.with_stats(|s| s.record_miss());

        let result = cell
            .get_or_try_init(|| async {
                self.with_stats(|s| s.record_fetch());
                source.fetch(key).await.map(Arc::new)
            })
            .await;

        match result {
            Ok(data) => Ok(data.clone()),
            Err(e) => {
                self.with_stats(|s| s.record_failure());
                Err(e)
            }
        }
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        self.with_stats(|s| *s)
    }

    fn with_stats<R>(&self, f: impl FnOnce(&mut CacheStats) -> R) -> R {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::http::tests::MockHttpClient;
    use crate::boundary::source::RemoteBoundarySource;

    const BASE: &str = "https://boundaries.example.com/repo";
    const EMPTY: &str = r#"{"type":"FeatureCollection","features":[]}"#;

    fn states_url() -> String {
        format!("{}/INDIA/INDIA_STATES.geojson", BASE)
    }

    fn source_with_states() -> RemoteBoundarySource<MockHttpClient> {
        let client = MockHttpClient::new().with_response(&states_url(), EMPTY);
        RemoteBoundarySource::new(BASE, client)
    }

    #[tokio::test]
    async fn test_first_fetch_populates_cache() {
        let cache = BoundaryCache::new();
        let source = source_with_states();

        assert!(!cache.contains(&BoundaryKey::States));
        let result = cache.get_or_fetch(&BoundaryKey::States, &source).await;
        assert!(result.is_ok());
        assert!(cache.contains(&BoundaryKey::States));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_second_request_is_a_hit() {
        let cache = BoundaryCache::new();
        let client = MockHttpClient::new().with_response(&states_url(), EMPTY);
        let source = RemoteBoundarySource::new(BASE, client);

        cache
            .get_or_fetch(&BoundaryKey::States, &source)
            .await
            .unwrap();
        cache
            .get_or_fetch(&BoundaryKey::States, &source)
            .await
            .unwrap();

        let stats = cache.stats();
        assert_eq!(stats.fetches, 1, "Second request must not fetch");
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let cache = Arc::new(BoundaryCache::new());
        let client = MockHttpClient::new().with_response(&states_url(), EMPTY);
        let source = Arc::new(RemoteBoundarySource::new(BASE, client));

        let (a, b) = tokio::join!(
            cache.get_or_fetch(&BoundaryKey::States, source.as_ref()),
            cache.get_or_fetch(&BoundaryKey::States, source.as_ref()),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(
            cache.stats().fetches,
            1,
            "Racing requests must be de-duplicated"
        );
    }

    #[tokio::test]
    async fn test_failure_leaves_entry_absent() {
        let cache = BoundaryCache::new();
        let failing = RemoteBoundarySource::new(BASE, MockHttpClient::new());

        let result = cache.get_or_fetch(&BoundaryKey::States, &failing).await;
        assert!(result.is_err());
        assert!(!cache.contains(&BoundaryKey::States));
        assert_eq!(cache.stats().failures, 1);

        // Retrying the same action after the failure fetches again and can
        // succeed.
        let source = source_with_states();
        let retry = cache.get_or_fetch(&BoundaryKey::States, &source).await;
        assert!(retry.is_ok());
        assert!(cache.contains(&BoundaryKey::States));
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_separately() {
        let cache = BoundaryCache::new();
        let districts_url = format!("{}/STATES/ORISSA/ODISHA_DISTRICTS.geojson", BASE);
        let client = MockHttpClient::new()
            .with_response(&states_url(), EMPTY)
            .with_response(&districts_url, EMPTY);
        let source = RemoteBoundarySource::new(BASE, client);

        cache
            .get_or_fetch(&BoundaryKey::States, &source)
            .await
            .unwrap();
        cache
            .get_or_fetch(&BoundaryKey::districts("Odisha"), &source)
            .await
            .unwrap();

        assert_eq!(cache.stats().fetches, 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_get_does_not_fetch() {
        let cache = BoundaryCache::new();
        assert!(cache.get(&BoundaryKey::States).is_none());
        assert_eq!(cache.stats().fetches, 0);
    }
}
