//! Generator configuration types.
//!
//! `GeneratorConfig` represents the optional `appligen.toml` plus environment
//! overrides. All fields have defaults so an empty file (or none) is valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::ProviderMode;
use crate::section::SectionSet;

/// Top-level configuration for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Raw `PROVIDER_MODE`: `auto`, a backend name, or unset for all-available.
    pub provider_mode: Option<String>,
    /// Whether the chain advances past a failing backend.
    pub enable_fallback: bool,
    pub cache_path: PathBuf,
    pub clear_cache_before_run: bool,
    /// Upper bound for a single backend `generate` call.
    pub call_timeout_secs: u64,
    /// Upper bound for a single availability probe.
    pub probe_timeout_secs: u64,
    pub sections: SectionSet,
    pub local: LocalBackendConfig,
    pub remote: RemoteBackendConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider_mode: None,
            enable_fallback: true,
            cache_path: PathBuf::from(".cache/content_cache.json"),
            clear_cache_before_run: false,
            call_timeout_secs: 10,
            probe_timeout_secs: 5,
            sections: SectionSet::default(),
            local: LocalBackendConfig::default(),
            remote: RemoteBackendConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn provider_mode(&self) -> ProviderMode {
        ProviderMode::from_setting(self.provider_mode.as_deref())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Local model service (Ollama) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalBackendConfig {
    pub enabled: bool,
    pub host: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub priority: u32,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            priority: 0,
        }
    }
}

/// Hosted API (Anthropic) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteBackendConfig {
    pub enabled: bool,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub priority: u32,
}

impl Default for RemoteBackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            priority: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert!(config.enable_fallback);
        assert!(!config.clear_cache_before_run);
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
        assert_eq!(config.provider_mode(), ProviderMode::AllAvailable);
        assert_eq!(config.local.priority, 0);
        assert_eq!(config.remote.priority, 1);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: GeneratorConfig = toml::from_str("").unwrap();
        assert_eq!(config.local.model, "llama3.2:3b");
        assert_eq!(config.sections, SectionSet::CoverLetter);
    }

    #[test]
    fn test_partial_toml() {
        let toml_str = r#"
provider_mode = "auto"
call_timeout_secs = 30
sections = "full"

[remote]
model = "claude-sonnet-4-20250514"
priority = 0

[local]
enabled = false
"#;
        let config: GeneratorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider_mode(), ProviderMode::Auto);
        assert_eq!(config.call_timeout_secs, 30);
        assert_eq!(config.sections, SectionSet::Full);
        assert_eq!(config.remote.model, "claude-sonnet-4-20250514");
        assert_eq!(config.remote.api_key_env, "ANTHROPIC_API_KEY");
        assert!(!config.local.enabled);
        assert_eq!(config.local.host, "http://localhost:11434");
    }
}
