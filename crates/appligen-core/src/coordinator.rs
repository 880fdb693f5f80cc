//! Multi-provider run coordinator.
//!
//! Top-level driver for one generation invocation. Order of operations:
//!
//! 1. validate the provider mode against the registry (the only fatal error),
//! 2. clear the cache if requested, exactly once,
//! 3. probe every backend once, concurrently,
//! 4. generate one output set (auto / pinned) or one per available backend
//!    (all-available), the latter concurrently with a join barrier.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use uuid::Uuid;

use appligen_types::backend::ProviderMode;
use appligen_types::config::GeneratorConfig;
use appligen_types::error::{CacheError, ConfigError};
use appligen_types::generation::{ApplicationInputs, RunReport};
use appligen_types::section::SectionType;

use crate::backend::{BackendRegistry, BoxGenerationBackend};
use crate::cache::{CacheStats, ContentCache, SectionCache};
use crate::fallback::FallbackChain;
use crate::generator::SectionGenerator;
use crate::probe::{ProbeOutcome, probe_backends};

/// Per-run policy, resolved once from configuration.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: ProviderMode,
    pub fallback_enabled: bool,
    pub call_timeout: Duration,
    pub probe_timeout: Duration,
    pub clear_cache: bool,
    pub sections: Vec<SectionType>,
}

impl RunSettings {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            mode: config.provider_mode(),
            fallback_enabled: config.enable_fallback,
            call_timeout: config.call_timeout(),
            probe_timeout: config.probe_timeout(),
            clear_cache: config.clear_cache_before_run,
            sections: config.sections.sections(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

pub struct RunCoordinator<C> {
    registry: BackendRegistry,
    generator: SectionGenerator<C>,
    settings: RunSettings,
}

impl<C: ContentCache> RunCoordinator<C> {
    pub fn new(registry: BackendRegistry, cache: C, settings: RunSettings) -> Self {
        Self {
            registry,
            generator: SectionGenerator::new(Arc::new(SectionCache::new(cache))),
            settings,
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn cache(&self) -> &SectionCache<C> {
        self.generator.cache()
    }

    /// Probe every registered backend without generating anything.
    pub async fn probe(&self) -> ProbeOutcome {
        probe_backends(self.registry.backends(), self.settings.probe_timeout).await
    }

    pub async fn cache_stats(&self) -> Result<CacheStats, CacheError> {
        self.cache().stats().await
    }

    /// Reject settings no run can work with: an unknown pinned backend, an
    /// empty section list, or a zero call timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let ProviderMode::Pinned(name) = &self.settings.mode {
            self.registry.resolve(name)?;
        }
        if self.settings.sections.is_empty() {
            return Err(ConfigError::Invalid {
                key: "sections".to_string(),
                message: "no sections selected".to_string(),
            });
        }
        if self.settings.call_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "call_timeout_secs".to_string(),
                message: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    /// Execute one generation run.
    ///
    /// Only configuration errors are returned; backend, chain and cache
    /// failures degrade the output instead.
    pub async fn run(&self, inputs: &ApplicationInputs) -> Result<RunReport, ConfigError> {
        self.validate()?;

        let run_id = Uuid::now_v7();
        tracing::info!(%run_id, mode = %self.settings.mode, "Starting generation run");

        let cache_entries_cleared = if self.settings.clear_cache {
            match self.cache().clear().await {
                Ok(removed) => {
                    tracing::info!(removed, "Cache cleared before run");
                    Some(removed)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to clear cache, continuing");
                    None
                }
            }
        } else {
            None
        };

        let probe = self.probe().await;
        let skipped = probe.unavailable();
        for name in &skipped {
            tracing::info!(backend = %name, "Skipping unavailable backend");
        }

        let sections = &self.settings.sections;
        let mut outputs = BTreeMap::new();

        match &self.settings.mode {
            ProviderMode::Auto => {
                let chain = FallbackChain::automatic(
                    probe.available(),
                    self.settings.fallback_enabled,
                    self.settings.call_timeout,
                );
                let output = self.generator.generate_all_sections(&chain, inputs, sections).await;
                outputs.insert(output.backend_name.clone(), output);
            }
            ProviderMode::Pinned(name) => {
                let backend = self.registry.resolve(name)?.clone();
                if !probe.is_available(name) {
                    tracing::warn!(backend = %name, "Pinned backend failed its probe, trying anyway");
                }
                let chain = FallbackChain::pinned(backend, self.settings.call_timeout);
                let output = self.generator.generate_all_sections(&chain, inputs, sections).await;
                outputs.insert(output.backend_name.clone(), output);
            }
            ProviderMode::AllAvailable => {
                let runs = probe.available().into_iter().map(|backend: BoxGenerationBackend| {
                    let chain = FallbackChain::scoped(backend, self.settings.call_timeout);
                    async move {
                        self.generator
                            .generate_all_sections(&chain, inputs, sections)
                            .await
                    }
                });
                for output in join_all(runs).await {
                    outputs.insert(output.backend_name.clone(), output);
                }
            }
        }

        let report = RunReport {
            run_id,
            outputs,
            skipped,
            cache_entries_cleared,
        };
        tracing::info!(
            %run_id,
            output_sets = report.outputs.len(),
            partial_failure = report.any_partial_failure(),
            "Generation run finished"
        );
        Ok(report)
    }
}
