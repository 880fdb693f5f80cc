//! Generator configuration loader.
//!
//! Reads `appligen.toml` (or the file given with `--config`) into
//! [`GeneratorConfig`] and applies environment overrides on top. A missing
//! file means defaults; a malformed file is an error, reported before any
//! generation starts.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use appligen_types::config::GeneratorConfig;
use appligen_types::error::ConfigError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "appligen.toml";

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`GeneratorConfig::default()`].
/// - If the file exists but cannot be read or parsed, returns an error.
pub async fn load_config(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return Ok(GeneratorConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<GeneratorConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Apply environment overrides. `lookup` is usually `|k| std::env::var(k).ok()`.
///
/// Unset variables leave the config untouched. Values that do not parse
/// (booleans, numbers) are rejected rather than ignored.
pub fn apply_env_overrides(
    config: &mut GeneratorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(mode) = lookup("PROVIDER_MODE") {
        let mode = mode.trim();
        config.provider_mode = (!mode.is_empty()).then(|| mode.to_string());
    }
    if let Some(value) = lookup("ENABLE_FALLBACK") {
        config.enable_fallback = parse_bool("ENABLE_FALLBACK", &value)?;
    }
    if let Some(value) = lookup("CACHE_PATH") {
        config.cache_path = PathBuf::from(value.trim());
    }
    if let Some(value) = lookup("CLEAR_CACHE_BEFORE_RUN") {
        config.clear_cache_before_run = parse_bool("CLEAR_CACHE_BEFORE_RUN", &value)?;
    }
    if let Some(value) = lookup("CALL_TIMEOUT_SECS") {
        let secs: u64 = parse_number("CALL_TIMEOUT_SECS", &value)?;
        if secs == 0 {
            return Err(ConfigError::Invalid {
                key: "CALL_TIMEOUT_SECS".to_string(),
                message: "must be at least 1 second".to_string(),
            });
        }
        config.call_timeout_secs = secs;
    }

    if let Some(value) = lookup("OLLAMA_HOST") {
        config.local.host = value.trim().to_string();
    }
    if let Some(value) = lookup("LLAMA_MODEL") {
        config.local.model = value.trim().to_string();
    }
    if let Some(value) = lookup("LLAMA_TEMPERATURE") {
        config.local.temperature = parse_number("LLAMA_TEMPERATURE", &value)?;
    }
    if let Some(value) = lookup("LLAMA_MAX_TOKENS") {
        config.local.max_tokens = parse_number("LLAMA_MAX_TOKENS", &value)?;
    }

    if let Some(value) = lookup("ANTHROPIC_MODEL") {
        config.remote.model = value.trim().to_string();
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("'{}': {e}", value.trim()),
    })
}
