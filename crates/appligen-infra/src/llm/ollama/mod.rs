//! Local model service backend (Ollama).

pub mod client;
pub mod types;

pub use client::OllamaBackend;
