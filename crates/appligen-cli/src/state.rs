//! Application state wiring configuration, backends and cache together.
//!
//! The core coordinator is generic over the cache trait; AppState pins it to
//! the JSON file cache from appligen-infra.

use std::path::PathBuf;

use appligen_core::backend::BackendRegistry;
use appligen_core::coordinator::{RunCoordinator, RunSettings};
use appligen_infra::cache::JsonFileCache;
use appligen_infra::config::{DEFAULT_CONFIG_FILE, apply_env_overrides, load_config};
use appligen_infra::llm::build_registry;
use appligen_types::config::GeneratorConfig;

/// Coordinator pinned to the persistent cache.
pub type ConcreteCoordinator = RunCoordinator<JsonFileCache>;

/// Resolved configuration shared by all commands.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: GeneratorConfig,
    pub config_path: PathBuf,
}

impl AppState {
    /// Load the config file (if any) and apply environment overrides.
    pub async fn init(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = load_config(&config_path).await?;
        apply_env_overrides(&mut config, env_lookup)?;

        tracing::debug!(
            config = %config_path.display(),
            mode = %config.provider_mode(),
            cache = %config.cache_path.display(),
            "Configuration loaded"
        );
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn registry(&self) -> BackendRegistry {
        build_registry(&self.config, env_lookup)
    }

    pub fn cache(&self) -> JsonFileCache {
        JsonFileCache::new(&self.config.cache_path)
    }

    pub fn coordinator(&self) -> ConcreteCoordinator {
        RunCoordinator::new(
            self.registry(),
            self.cache(),
            RunSettings::from_config(&self.config),
        )
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
