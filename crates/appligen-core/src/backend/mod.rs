//! Generation backend abstractions.
//!
//! - `GenerationBackend`: RPITIT trait for concrete backends
//! - `BoxGenerationBackend`: object-safe, cloneable wrapper for dynamic dispatch
//! - `BackendRegistry`: priority-ordered set of configured backends
//! - `StaticBackend`: the always-available terminal fallback

pub mod box_backend;
pub mod provider;
pub mod registry;
pub mod static_backend;

pub use box_backend::BoxGenerationBackend;
pub use provider::GenerationBackend;
pub use registry::BackendRegistry;
pub use static_backend::StaticBackend;
