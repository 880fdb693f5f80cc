use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::section::SectionType;

/// Failure of a single backend call. Every variant advances the fallback chain.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendError {
    /// Transient: service down, no credential, rate limited.
    #[error("backend '{backend}' unavailable: {reason}")]
    Unavailable { backend: String, reason: String },

    /// The call exceeded the per-call timeout. Treated like `Unavailable`.
    #[error("backend '{backend}' timed out after {after_secs}s")]
    Timeout { backend: String, after_secs: u64 },

    /// The backend answered but produced no usable content.
    #[error("backend '{backend}' failed: {message}")]
    Failed { backend: String, message: String },
}

impl BackendError {
    pub fn unavailable(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        BackendError::Unavailable {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    pub fn failed(backend: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Failed {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Unavailable and timed-out backends are expected; failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::Unavailable { .. } | BackendError::Timeout { .. }
        )
    }

    pub fn backend(&self) -> &str {
        match self {
            BackendError::Unavailable { backend, .. }
            | BackendError::Timeout { backend, .. }
            | BackendError::Failed { backend, .. } => backend,
        }
    }
}

/// One failed step of a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAttempt {
    pub backend: String,
    pub error: BackendError,
}

/// No backend in the chain produced the section.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("all backends exhausted for section '{section}' ({} attempt(s))", attempts.len())]
pub struct ChainExhausted {
    pub section: SectionType,
    pub attempts: Vec<ChainAttempt>,
}

impl ChainExhausted {
    pub fn last_error(&self) -> Option<&BackendError> {
        self.attempts.last().map(|a| &a.error)
    }
}

/// Errors from the content cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Errors that abort a run before any generation happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown backend '{0}'")]
    UnknownBackend(String),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("failed to read config '{path}': {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config '{path}': {message}")]
    Parse { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_classification() {
        assert!(BackendError::unavailable("local", "connection refused").is_transient());
        assert!(
            BackendError::Timeout {
                backend: "remote".to_string(),
                after_secs: 10
            }
            .is_transient()
        );
        assert!(!BackendError::failed("remote", "empty response").is_transient());
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::failed("remote", "HTTP 400");
        assert_eq!(err.to_string(), "backend 'remote' failed: HTTP 400");
        assert_eq!(err.backend(), "remote");
    }

    #[test]
    fn test_chain_exhausted_display() {
        let err = ChainExhausted {
            section: SectionType::Motivation,
            attempts: vec![ChainAttempt {
                backend: "remote".to_string(),
                error: BackendError::unavailable("remote", "down"),
            }],
        };
        assert!(err.to_string().contains("motivationstext"));
        assert!(err.to_string().contains("1 attempt"));
        assert!(err.last_error().is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownBackend("gpt".to_string());
        assert_eq!(err.to_string(), "unknown backend 'gpt'");
    }
}
