//! Shared domain types for the application content generator.
//!
//! Sections, generation requests and results, per-backend output sets,
//! backend descriptors, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod backend;
pub mod config;
pub mod error;
pub mod generation;
pub mod section;
