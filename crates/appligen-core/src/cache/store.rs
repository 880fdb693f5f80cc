//! ContentCache trait definition.
//!
//! Persistent fingerprint -> result storage. Implementations live in
//! appligen-infra (JSON file) and in this crate (in-memory, for tests and
//! `--no-cache` runs).

use serde::{Deserialize, Serialize};

use appligen_types::error::CacheError;
use appligen_types::generation::GenerationResult;

/// Summary of the cache contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entry_count: usize,
    /// Size of the backing store in bytes (serialized size for memory caches).
    pub size_bytes: u64,
    /// Sum of `tokens_used` over all cached results.
    pub total_tokens: u64,
}

/// Key-value store for generated section content.
///
/// Keys are request fingerprints. At most one entry exists per fingerprint;
/// `store` overwrites, so storing the same pair twice is observably a no-op.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ContentCache: Send + Sync {
    fn lookup(
        &self,
        fingerprint: &str,
    ) -> impl std::future::Future<Output = Result<Option<GenerationResult>, CacheError>> + Send;

    fn store(
        &self,
        fingerprint: &str,
        result: &GenerationResult,
    ) -> impl std::future::Future<Output = Result<(), CacheError>> + Send;

    /// Remove every entry. Returns how many were removed.
    fn clear(&self) -> impl std::future::Future<Output = Result<usize, CacheError>> + Send;

    fn stats(&self) -> impl std::future::Future<Output = Result<CacheStats, CacheError>> + Send;
}
