//! In-memory content cache.

use dashmap::DashMap;

use appligen_types::error::CacheError;
use appligen_types::generation::GenerationResult;

use super::store::{CacheStats, ContentCache};

/// Non-persistent cache backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryContentCache {
    entries: DashMap<String, GenerationResult>,
}

impl MemoryContentCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentCache for MemoryContentCache {
    async fn lookup(&self, fingerprint: &str) -> Result<Option<GenerationResult>, CacheError> {
        Ok(self.entries.get(fingerprint).map(|entry| entry.value().clone()))
    }

    async fn store(&self, fingerprint: &str, result: &GenerationResult) -> Result<(), CacheError> {
        self.entries.insert(fingerprint.to_string(), result.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let removed = self.entries.len();
        self.entries.clear();
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats::default();
        for entry in self.entries.iter() {
            let encoded = serde_json::to_vec(entry.value())
                .map_err(|e| CacheError::Serialization(e.to_string()))?;
            stats.entry_count += 1;
            stats.size_bytes += (entry.key().len() + encoded.len()) as u64;
            stats.total_tokens += entry.value().tokens_used;
        }
        Ok(stats)
    }
}
