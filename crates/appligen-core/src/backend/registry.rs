//! Backend registry for configuration-driven backend lookup.
//!
//! Holds every configured backend ordered by fallback priority. The static
//! backend is always registered so automatic chains have a terminal entry.

use appligen_types::error::ConfigError;

use super::box_backend::BoxGenerationBackend;
use super::static_backend::StaticBackend;

/// Registry of configured generation backends, sorted by priority.
///
/// Ties are broken by name so iteration order is deterministic.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: Vec<BoxGenerationBackend>,
}

impl BackendRegistry {
    /// Create a registry containing only the static backend.
    pub fn new() -> Self {
        let mut registry = Self {
            backends: Vec::new(),
        };
        registry.register(BoxGenerationBackend::new(StaticBackend::new()));
        registry
    }

    /// Register a backend. A backend with the same name is replaced.
    pub fn register(&mut self, backend: BoxGenerationBackend) {
        self.backends.retain(|b| b.name() != backend.name());
        self.backends.push(backend);
        self.backends.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
    }

    pub fn get(&self, name: &str) -> Option<&BoxGenerationBackend> {
        self.backends.iter().find(|b| b.name() == name)
    }

    /// Look up a backend the operator named explicitly.
    pub fn resolve(&self, name: &str) -> Result<&BoxGenerationBackend, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))
    }

    /// All backends in priority order.
    pub fn backends(&self) -> &[BoxGenerationBackend] {
        &self.backends
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::provider::GenerationBackend;
    use appligen_types::backend::{BackendDescriptor, BackendKind};
    use appligen_types::error::BackendError;
    use appligen_types::generation::{GenerationRequest, GenerationResult};

    struct NamedBackend {
        descriptor: BackendDescriptor,
    }

    impl NamedBackend {
        fn boxed(name: &str, priority: u32) -> BoxGenerationBackend {
            BoxGenerationBackend::new(Self {
                descriptor: BackendDescriptor {
                    name: name.to_string(),
                    kind: BackendKind::Remote,
                    priority,
                    model: format!("{name}-model"),
                },
            })
        }
    }

    impl GenerationBackend for NamedBackend {
        fn descriptor(&self) -> &BackendDescriptor {
            &self.descriptor
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult, BackendError> {
            Err(BackendError::failed(self.name(), "not used"))
        }
    }

    #[test]
    fn test_static_backend_always_present() {
        let registry = BackendRegistry::new();
        assert_eq!(registry.names(), vec!["static"]);
    }

    #[test]
    fn test_priority_ordering() {
        let mut registry = BackendRegistry::new();
        registry.register(NamedBackend::boxed("remote", 1));
        registry.register(NamedBackend::boxed("local", 0));
        assert_eq!(registry.names(), vec!["local", "remote", "static"]);
    }

    #[test]
    fn test_equal_priority_sorted_by_name() {
        let mut registry = BackendRegistry::new();
        registry.register(NamedBackend::boxed("zeta", 1));
        registry.register(NamedBackend::boxed("alpha", 1));
        assert_eq!(registry.names(), vec!["alpha", "zeta", "static"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = BackendRegistry::new();
        registry.register(NamedBackend::boxed("remote", 1));
        registry.register(NamedBackend::boxed("remote", 5));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("remote").unwrap().priority(), 5);
    }

    #[test]
    fn test_resolve_unknown_backend() {
        let registry = BackendRegistry::new();
        let err = registry.resolve("gpt").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackend(name) if name == "gpt"));
        assert!(registry.resolve("static").is_ok());
    }
}
