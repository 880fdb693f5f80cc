//! Fingerprint-locked access to a content cache.
//!
//! `SectionCache` is the only way the generator touches the cache. Each
//! lookup-miss-generate-store sequence runs under a per-fingerprint async
//! lock, released when the guard drops, so two concurrent requests with the
//! same fingerprint produce exactly one backend call and one write.
//! Different fingerprints never contend.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use appligen_types::error::CacheError;
use appligen_types::generation::{GenerationRequest, GenerationResult, meta};

use super::fingerprint::{fingerprint, variant_fingerprint};
use super::store::{CacheStats, ContentCache};

/// A content cache plus the per-fingerprint lock table.
pub struct SectionCache<C> {
    store: C,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: ContentCache> SectionCache<C> {
    pub fn new(store: C) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    /// The underlying store.
    pub fn store_ref(&self) -> &C {
        &self.store
    }

    /// Cached result for `request`, marked `from_cache`. Read errors count as a miss.
    pub async fn lookup(&self, request: &GenerationRequest) -> Option<GenerationResult> {
        self.lookup_fingerprint(&fingerprint(request)).await
    }

    /// Persist a freshly generated result. Failures are logged, never propagated.
    pub async fn store(&self, request: &GenerationRequest, result: &GenerationResult) -> bool {
        self.store_fingerprint(&fingerprint(request), result).await
    }

    pub async fn clear(&self) -> Result<usize, CacheError> {
        self.store.clear().await
    }

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        self.store.stats().await
    }

    /// Serve `request` from the cache, or run `generate` and store its output.
    ///
    /// The lock for the request's fingerprint is held for the whole sequence.
    /// Nothing is stored unless `generate` returns `Ok`, so an abandoned
    /// (dropped) call leaves the cache untouched.
    pub async fn get_or_generate<F, Fut, E>(
        &self,
        request: &GenerationRequest,
        generate: F,
    ) -> Result<GenerationResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<GenerationResult, E>>,
    {
        self.get_or_generate_as(request, None, generate).await
    }

    /// Like [`get_or_generate`](Self::get_or_generate), but when `producer`
    /// is set only text produced by that backend counts as a hit.
    ///
    /// The shared entry stays with whichever backend claimed it first. Any
    /// other producer reads and writes its own variant entry instead.
    pub async fn get_or_generate_as<F, Fut, E>(
        &self,
        request: &GenerationRequest,
        producer: Option<&str>,
        generate: F,
    ) -> Result<GenerationResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<GenerationResult, E>>,
    {
        let key = fingerprint(request);
        let _lock = self.acquire(&key).await;

        let shared = self.lookup_fingerprint(&key).await;
        let store_key = match (shared, producer) {
            (None, _) => key,
            (Some(hit), None) => return Ok(hit),
            (Some(hit), Some(producer)) if hit.produced_by() == Some(producer) => return Ok(hit),
            (Some(hit), Some(producer)) => {
                tracing::debug!(
                    section = %request.section,
                    cached_by = ?hit.produced_by(),
                    backend = producer,
                    "Shared entry belongs to another backend"
                );
                let variant = variant_fingerprint(request, producer);
                if let Some(own) = self.lookup_fingerprint(&variant).await {
                    return Ok(own);
                }
                variant
            }
        };

        let mut result = generate().await?;
        result
            .metadata
            .insert(meta::FROM_CACHE.to_string(), false.into());
        self.store_fingerprint(&store_key, &result).await;
        Ok(result)
    }

    async fn acquire(&self, key: &str) -> FingerprintLock<'_> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        FingerprintLock {
            locks: &self.locks,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    async fn lookup_fingerprint(&self, key: &str) -> Option<GenerationResult> {
        match self.store.lookup(key).await {
            Ok(Some(mut hit)) => {
                tracing::debug!(fingerprint = %short(key), section = %hit.section, "Cache hit");
                hit.metadata
                    .insert(meta::FROM_CACHE.to_string(), true.into());
                Some(hit)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(fingerprint = %short(key), error = %e, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn store_fingerprint(&self, key: &str, result: &GenerationResult) -> bool {
        match self.store.store(key, result).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(fingerprint = %short(key), error = %e, "Failed to store generated content");
                false
            }
        }
    }
}

/// Held fingerprint lock. Dropping it, also when the owning future is
/// abandoned, unlocks and removes the table entry once nobody waits on it.
struct FingerprintLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FingerprintLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn short(key: &str) -> &str {
    &key[..key.len().min(12)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryContentCache;
    use appligen_types::error::BackendError;
    use appligen_types::generation::ApplicationInputs;
    use appligen_types::section::SectionType;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn request(section: SectionType) -> GenerationRequest {
        GenerationRequest::for_section(
            section,
            &ApplicationInputs {
                profile_text: "profile".to_string(),
                job_text: "job".to_string(),
                company_name: "Acme".to_string(),
                position_title: "Engineer".to_string(),
                reference_id: None,
            },
        )
    }

    fn result(section: SectionType, text: &str) -> GenerationResult {
        GenerationResult {
            section,
            generated_text: text.to_string(),
            confidence: 0.8,
            tokens_used: 10,
            processing_time: 0.1,
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_lookup_after_store_returns_result() {
        let cache = SectionCache::new(MemoryContentCache::new());
        let req = request(SectionType::Opening);
        assert!(cache.lookup(&req).await.is_none());

        assert!(cache.store(&req, &result(SectionType::Opening, "hi")).await);
        let hit = cache.lookup(&req).await.unwrap();
        assert_eq!(hit.generated_text, "hi");
        assert!(hit.from_cache());
    }

    #[tokio::test]
    async fn test_get_or_generate_miss_then_hit() {
        let cache = SectionCache::new(MemoryContentCache::new());
        let req = request(SectionType::Motivation);

        let first: Result<_, BackendError> = cache
            .get_or_generate(&req, || async { Ok(result(SectionType::Motivation, "fresh")) })
            .await;
        let first = first.unwrap();
        assert!(!first.from_cache());

        let second: Result<_, BackendError> = cache
            .get_or_generate(&req, || async {
                Err(BackendError::failed("test", "must be served from cache"))
            })
            .await;
        let second = second.unwrap();
        assert!(second.from_cache());
        assert_eq!(second.generated_text, "fresh");
    }

    #[tokio::test]
    async fn test_failed_generation_is_not_stored() {
        let cache = SectionCache::new(MemoryContentCache::new());
        let req = request(SectionType::Closing);

        let outcome = cache
            .get_or_generate(&req, || async {
                Err::<GenerationResult, _>(BackendError::failed("remote", "bad response"))
            })
            .await;
        assert!(outcome.is_err());
        assert_eq!(cache.stats().await.unwrap().entry_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_same_fingerprint_generates_once() {
        let cache = Arc::new(SectionCache::new(MemoryContentCache::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let req = request(SectionType::Opening);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let req = req.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_generate(&req, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, BackendError>(result(SectionType::Opening, "once"))
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut from_cache = 0;
        for handle in handles {
            if handle.await.unwrap().from_cache() {
                from_cache += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(from_cache, 7);
        assert_eq!(cache.stats().await.unwrap().entry_count, 1);
        assert!(cache.locks.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_generation_leaves_cache_untouched() {
        let cache = SectionCache::new(MemoryContentCache::new());
        let req = request(SectionType::Opening);

        let slow = cache.get_or_generate(&req, || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BackendError>(result(SectionType::Opening, "late"))
        });
        let timed_out = tokio::time::timeout(Duration::from_millis(20), slow).await;
        assert!(timed_out.is_err());

        assert!(cache.lookup(&req).await.is_none());
        // The lock and its table entry went away with the dropped future.
        assert!(cache.locks.is_empty());
        let next: Result<_, BackendError> = cache
            .get_or_generate(&req, || async { Ok(result(SectionType::Opening, "now")) })
            .await;
        assert_eq!(next.unwrap().generated_text, "now");
    }

    fn produced(section: SectionType, text: &str, backend: &str) -> GenerationResult {
        let mut result = result(section, text);
        result
            .metadata
            .insert(meta::BACKEND.to_string(), backend.into());
        result
    }

    #[tokio::test]
    async fn test_scoped_producer_ignores_other_backends_entry() {
        let cache = SectionCache::new(MemoryContentCache::new());
        let req = request(SectionType::Opening);

        let local: Result<_, BackendError> = cache
            .get_or_generate_as(&req, Some("local"), || async {
                Ok(produced(SectionType::Opening, "lokal", "local"))
            })
            .await;
        assert!(!local.unwrap().from_cache());

        let remote: Result<_, BackendError> = cache
            .get_or_generate_as(&req, Some("remote"), || async {
                Ok(produced(SectionType::Opening, "entfernt", "remote"))
            })
            .await;
        let remote = remote.unwrap();
        assert!(!remote.from_cache());
        assert_eq!(remote.generated_text, "entfernt");

        // The shared entry keeps the first producer's text.
        assert_eq!(cache.lookup(&req).await.unwrap().generated_text, "lokal");
        assert_eq!(cache.stats().await.unwrap().entry_count, 2);

        // Both backends are now served from their own entries.
        for (backend, text) in [("local", "lokal"), ("remote", "entfernt")] {
            let hit: Result<_, BackendError> = cache
                .get_or_generate_as(&req, Some(backend), || async {
                    Err(BackendError::failed(backend, "must be served from cache"))
                })
                .await;
            let hit = hit.unwrap();
            assert!(hit.from_cache());
            assert_eq!(hit.generated_text, text);
        }
    }

    #[tokio::test]
    async fn test_scoped_failure_does_not_fall_back_to_shared_entry() {
        let cache = SectionCache::new(MemoryContentCache::new());
        let req = request(SectionType::Closing);
        assert!(cache.store(&req, &produced(SectionType::Closing, "lokal", "local")).await);

        let outcome = cache
            .get_or_generate_as(&req, Some("remote"), || async {
                Err::<GenerationResult, _>(BackendError::unavailable("remote", "down"))
            })
            .await;
        assert!(outcome.is_err());
        assert_eq!(cache.stats().await.unwrap().entry_count, 1);
    }
}
