//! Availability probing.
//!
//! Every backend is probed once at the start of a run, concurrently, each
//! probe bounded by a timeout. A probe that times out counts as unavailable.

use std::time::{Duration, Instant};

use futures_util::future::join_all;

use appligen_types::backend::ProbeReport;

use crate::backend::BoxGenerationBackend;

/// Probe results for one run, in registry (priority) order.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    entries: Vec<(BoxGenerationBackend, ProbeReport)>,
}

impl ProbeOutcome {
    pub fn reports(&self) -> Vec<ProbeReport> {
        self.entries.iter().map(|(_, report)| report.clone()).collect()
    }

    /// Backends whose probe succeeded, in priority order.
    pub fn available(&self) -> Vec<BoxGenerationBackend> {
        self.entries
            .iter()
            .filter(|(_, report)| report.available)
            .map(|(backend, _)| backend.clone())
            .collect()
    }

    /// Names of backends whose probe failed.
    pub fn unavailable(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, report)| !report.available)
            .map(|(_, report)| report.name.clone())
            .collect()
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(_, report)| report.name == name && report.available)
    }
}

/// Probe all `backends` concurrently.
pub async fn probe_backends(backends: &[BoxGenerationBackend], timeout: Duration) -> ProbeOutcome {
    let probes = backends.iter().map(|backend| async move {
        let start = Instant::now();
        let available = tokio::time::timeout(timeout, backend.is_available())
            .await
            .unwrap_or(false);
        let latency_ms = start.elapsed().as_millis() as u64;

        if available {
            tracing::debug!(backend = backend.name(), latency_ms, "Backend available");
        } else {
            tracing::info!(backend = backend.name(), latency_ms, "Backend unavailable");
        }

        let report = ProbeReport {
            name: backend.name().to_string(),
            kind: backend.kind(),
            model: backend.model_name().to_string(),
            priority: backend.priority(),
            available,
            latency_ms,
        };
        (backend.clone(), report)
    });

    ProbeOutcome {
        entries: join_all(probes).await,
    }
}
