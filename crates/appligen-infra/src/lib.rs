//! Infrastructure layer for the application content generator.
//!
//! Contains implementations of the ports defined in `appligen-core`: HTTP
//! generation backends (Ollama, Anthropic), the JSON file content cache,
//! and configuration loading.

pub mod cache;
pub mod config;
pub mod llm;
