//! Backend descriptors and provider selection modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Locally hosted model service (private, free).
    Local,
    /// Hosted API (needs a credential).
    Remote,
    /// Built-in canned content. Never fails.
    Static,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Static => write!(f, "static"),
        }
    }
}

/// Static description of a registered backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    pub name: String,
    pub kind: BackendKind,
    /// Fallback ordering; lower = tried first.
    pub priority: u32,
    pub model: String,
}

/// How the run coordinator picks backends. Resolved once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderMode {
    /// Fallback chain over all available backends, one output set.
    Auto,
    /// Exactly this backend, no fallback.
    Pinned(String),
    /// One independent output set per available backend.
    #[default]
    AllAvailable,
}

impl ProviderMode {
    /// Parse the `PROVIDER_MODE` setting. Unset or empty means all-available.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => ProviderMode::AllAvailable,
            Some(v) => v.parse().unwrap_or(ProviderMode::AllAvailable),
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderMode::Auto => write!(f, "auto"),
            ProviderMode::Pinned(name) => write!(f, "{name}"),
            ProviderMode::AllAvailable => write!(f, "all"),
        }
    }
}

impl FromStr for ProviderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "" => Err("provider mode must not be empty".to_string()),
            "auto" => Ok(ProviderMode::Auto),
            "all" | "all_available" | "all-available" => Ok(ProviderMode::AllAvailable),
            name => Ok(ProviderMode::Pinned(name.to_string())),
        }
    }
}

/// Result of probing one backend at run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub name: String,
    pub kind: BackendKind,
    pub model: String,
    pub priority: u32,
    pub available: bool,
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_mode_parsing() {
        assert_eq!("auto".parse::<ProviderMode>().unwrap(), ProviderMode::Auto);
        assert_eq!("ALL".parse::<ProviderMode>().unwrap(), ProviderMode::AllAvailable);
        assert_eq!(
            "remote".parse::<ProviderMode>().unwrap(),
            ProviderMode::Pinned("remote".to_string())
        );
        assert!("  ".parse::<ProviderMode>().is_err());
    }

    #[test]
    fn test_unset_provider_mode_is_all_available() {
        assert_eq!(ProviderMode::from_setting(None), ProviderMode::AllAvailable);
        assert_eq!(ProviderMode::from_setting(Some("")), ProviderMode::AllAvailable);
        assert_eq!(ProviderMode::from_setting(Some("auto")), ProviderMode::Auto);
    }

    #[test]
    fn test_provider_mode_display_roundtrip() {
        for mode in [
            ProviderMode::Auto,
            ProviderMode::AllAvailable,
            ProviderMode::Pinned("local".to_string()),
        ] {
            let parsed: ProviderMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_backend_kind_serde() {
        let json = serde_json::to_string(&BackendKind::Remote).unwrap();
        assert_eq!(json, "\"remote\"");
    }
}
