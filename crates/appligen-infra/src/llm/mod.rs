//! HTTP generation backends.
//!
//! Concrete [`GenerationBackend`](appligen_core::backend::GenerationBackend)
//! implementations for a local Ollama server and the Anthropic API, the
//! shared prompt catalogue, and a registry factory ([`build_registry`]) that
//! turns a [`GeneratorConfig`] into a [`BackendRegistry`].

pub mod anthropic;
pub mod ollama;
pub mod prompts;

use secrecy::SecretString;

use appligen_core::backend::{BackendRegistry, BoxGenerationBackend};
use appligen_types::config::GeneratorConfig;
use appligen_types::error::BackendError;

use self::anthropic::AnthropicBackend;
use self::ollama::OllamaBackend;

pub use self::anthropic::client::REMOTE_BACKEND_NAME;
pub use self::ollama::client::LOCAL_BACKEND_NAME;

/// Build the backend registry from configuration.
///
/// The static backend is always present. Local and remote backends are
/// registered when enabled, even if they are not currently reachable:
/// availability is decided by the run-start probe. `lookup` resolves
/// environment variables (the remote API key).
pub fn build_registry(
    config: &GeneratorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> BackendRegistry {
    let mut registry = BackendRegistry::new();

    if config.local.enabled {
        let backend = OllamaBackend::new(&config.local, config.probe_timeout());
        registry.register(BoxGenerationBackend::new(backend));
    }

    if config.remote.enabled {
        let api_key = lookup(&config.remote.api_key_env)
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);
        let backend = AnthropicBackend::new(&config.remote, api_key);
        registry.register(BoxGenerationBackend::new(backend));
    }

    tracing::debug!(backends = ?registry.names(), "Backend registry built");
    registry
}

/// Map a non-success HTTP status to a backend error.
///
/// Rate limiting and server-side errors (including Anthropic's 529
/// "overloaded") are transient; everything else is a hard failure.
pub(crate) fn classify_status(backend: &str, status: u16, body: &str) -> BackendError {
    let body = body.trim();
    match status {
        429 => BackendError::unavailable(backend, format!("rate limited: {body}")),
        500..=599 => BackendError::unavailable(backend, format!("HTTP {status}: {body}")),
        401 | 403 => BackendError::failed(backend, format!("authentication failed: {body}")),
        _ => BackendError::failed(backend, format!("HTTP {status}: {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appligen_types::backend::BackendKind;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_registry_contains_all_enabled_backends() {
        let registry = build_registry(&GeneratorConfig::default(), env(&[]));
        assert_eq!(registry.names(), vec!["local", "remote", "static"]);
        assert_eq!(
            registry.resolve("remote").unwrap().kind(),
            BackendKind::Remote
        );
    }

    #[test]
    fn test_disabled_backends_are_not_registered() {
        let mut config = GeneratorConfig::default();
        config.local.enabled = false;
        config.remote.enabled = false;
        let registry = build_registry(&config, env(&[]));
        assert_eq!(registry.names(), vec!["static"]);
    }

    #[test]
    fn test_priority_from_config() {
        let mut config = GeneratorConfig::default();
        config.remote.priority = 0;
        config.local.priority = 5;
        let registry = build_registry(&config, env(&[]));
        assert_eq!(registry.names(), vec!["remote", "local", "static"]);
    }

    #[tokio::test]
    async fn test_remote_key_read_from_configured_variable() {
        let mut config = GeneratorConfig::default();
        config.local.enabled = false;
        config.remote.api_key_env = "MY_CLAUDE_KEY".to_string();

        let registry = build_registry(&config, env(&[("MY_CLAUDE_KEY", "sk-ant-abc")]));
        assert!(registry.resolve("remote").unwrap().is_available().await);

        let registry = build_registry(&config, env(&[("ANTHROPIC_API_KEY", "sk-ant-abc")]));
        assert!(!registry.resolve("remote").unwrap().is_available().await);
    }

    #[test]
    fn test_status_classification() {
        assert!(classify_status("remote", 429, "").is_transient());
        assert!(classify_status("remote", 529, "overloaded").is_transient());
        assert!(classify_status("local", 503, "").is_transient());
        assert!(!classify_status("remote", 401, "bad key").is_transient());
        assert!(!classify_status("remote", 400, "bad request").is_transient());
        assert!(!classify_status("local", 404, "model not found").is_transient());
    }
}
