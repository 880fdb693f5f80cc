//! Provider fallback and caching orchestrator for application content.
//!
//! Defines the backend and cache "ports" that appligen-infra implements, plus
//! the orchestration on top of them: fallback chains, the section generator
//! and the multi-provider run coordinator. Depends only on `appligen-types`
//! -- never on HTTP or filesystem crates.

pub mod backend;
pub mod cache;
pub mod coordinator;
pub mod fallback;
pub mod generator;
pub mod posting;
pub mod probe;
pub mod variants;
