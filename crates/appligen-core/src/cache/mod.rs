//! Content cache: fingerprints, the storage trait, and locked access.

pub mod fingerprint;
pub mod memory;
pub mod section_cache;
pub mod store;

pub use fingerprint::{fingerprint, variant_fingerprint};
pub use memory::MemoryContentCache;
pub use section_cache::SectionCache;
pub use store::{CacheStats, ContentCache};
