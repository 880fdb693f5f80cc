//! JSON file content cache.
//!
//! One pretty-printed JSON object on disk mapping fingerprint -> result.
//! The file is read lazily on first access and rewritten in full on every
//! change (temp file + rename), so a crash mid-write never leaves a torn
//! file behind. A missing file is an empty cache. An unreadable or corrupt
//! file is also treated as empty (with a warning) and replaced on the next
//! write.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, MutexGuard};

use appligen_core::cache::{CacheStats, ContentCache};
use appligen_types::error::CacheError;
use appligen_types::generation::GenerationResult;

#[derive(Default)]
struct CacheState {
    loaded: bool,
    entries: BTreeMap<String, GenerationResult>,
}

/// Persistent [`ContentCache`] backed by a single JSON file.
pub struct JsonFileCache {
    path: PathBuf,
    state: Mutex<CacheState>,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock the state, loading the file on first use.
    async fn state(&self) -> MutexGuard<'_, CacheState> {
        let mut state = self.state.lock().await;
        if !state.loaded {
            state.entries = load_entries(&self.path).await;
            state.loaded = true;
        }
        state
    }

    async fn persist(&self, entries: &BTreeMap<String, GenerationResult>) -> Result<(), CacheError> {
        let encoded = serde_json::to_vec_pretty(entries)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &encoded).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, GenerationResult> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("No cache file at {}, starting empty", path.display());
            return BTreeMap::new();
        }
        Err(err) => {
            tracing::warn!("Failed to read cache {}: {err}, starting empty", path.display());
            return BTreeMap::new();
        }
    };

    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&content) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!("Cache file {} is corrupt: {err}, starting empty", path.display());
            return BTreeMap::new();
        }
    };

    let total = raw.len();
    let entries: BTreeMap<String, GenerationResult> = raw
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|r| (key, r)))
        .collect();
    if entries.len() < total {
        tracing::warn!(
            skipped = total - entries.len(),
            "Dropped unreadable entries from cache {}",
            path.display()
        );
    }
    tracing::debug!(entries = entries.len(), "Loaded cache {}", path.display());
    entries
}

impl std::fmt::Debug for JsonFileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileCache")
            .field("path", &self.path)
            .finish()
    }
}

impl ContentCache for JsonFileCache {
    async fn lookup(&self, fingerprint: &str) -> Result<Option<GenerationResult>, CacheError> {
        let state = self.state().await;
        Ok(state.entries.get(fingerprint).cloned())
    }

    async fn store(&self, fingerprint: &str, result: &GenerationResult) -> Result<(), CacheError> {
        let mut state = self.state().await;
        if state.entries.get(fingerprint) == Some(result) {
            return Ok(());
        }
        // Memory only changes once the file does.
        let mut next = state.entries.clone();
        next.insert(fingerprint.to_string(), result.clone());
        self.persist(&next).await?;
        state.entries = next;
        Ok(())
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let mut state = self.state().await;
        self.persist(&BTreeMap::new()).await?;
        let removed = state.entries.len();
        state.entries.clear();
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let state = self.state().await;
        let size_bytes = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == ErrorKind::NotFound => 0,
            Err(err) => return Err(err.into()),
        };
        Ok(CacheStats {
            entry_count: state.entries.len(),
            size_bytes,
            total_tokens: state.entries.values().map(|r| r.tokens_used).sum(),
        })
    }
}
