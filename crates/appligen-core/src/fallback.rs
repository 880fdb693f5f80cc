//! Backend fallback chain.
//!
//! Each section request walks an explicit state machine over an ordered list
//! of backends:
//!
//! ```text
//! NotStarted --start--> Trying(0)
//! Trying(i)  --ok-----> Succeeded(i)
//! Trying(i)  --err----> Trying(i+1)   (fallback enabled, i+1 < len)
//! Trying(i)  --err----> Exhausted     (otherwise)
//! ```
//!
//! Every backend error advances the chain, including timeouts. The chain is
//! built once per run from the availability probe, never per section.

use std::time::{Duration, Instant};

use tracing::Instrument;

use appligen_types::backend::BackendKind;
use appligen_types::error::{BackendError, ChainAttempt, ChainExhausted};
use appligen_types::generation::{GenerationRequest, GenerationResult, meta};

use crate::backend::{BoxGenerationBackend, StaticBackend};

/// Position of one section request within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    NotStarted,
    /// Calling the backend at this index.
    Trying(usize),
    /// The backend at this index produced the result.
    Succeeded(usize),
    Exhausted,
}

/// Input driving a [`ChainState`] transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEvent {
    Start,
    Success,
    Failure,
}

impl ChainState {
    /// Pure transition function. Terminal states absorb every event.
    pub fn next(self, event: ChainEvent, chain_len: usize, fallback_enabled: bool) -> ChainState {
        match (self, event) {
            (ChainState::NotStarted, ChainEvent::Start) if chain_len > 0 => ChainState::Trying(0),
            (ChainState::NotStarted, ChainEvent::Start) => ChainState::Exhausted,
            (ChainState::Trying(i), ChainEvent::Success) => ChainState::Succeeded(i),
            (ChainState::Trying(i), ChainEvent::Failure) if fallback_enabled && i + 1 < chain_len => {
                ChainState::Trying(i + 1)
            }
            (ChainState::Trying(_), ChainEvent::Failure) => ChainState::Exhausted,
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChainState::Succeeded(_) | ChainState::Exhausted)
    }
}

/// Ordered backends plus the policy for walking them.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    backends: Vec<BoxGenerationBackend>,
    fallback_enabled: bool,
    call_timeout: Duration,
    /// Output must come from the single backend of this chain, cache included.
    scoped: bool,
}

impl FallbackChain {
    /// Chain over probed-available backends in priority order, always ending
    /// with a static backend.
    pub fn automatic(
        mut available: Vec<BoxGenerationBackend>,
        fallback_enabled: bool,
        call_timeout: Duration,
    ) -> Self {
        available.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        if !available.iter().any(|b| b.kind() == BackendKind::Static) {
            available.push(BoxGenerationBackend::new(StaticBackend::new()));
        }
        Self {
            backends: available,
            fallback_enabled,
            call_timeout,
            scoped: false,
        }
    }

    /// Operator-pinned backend: one entry, no fallback, no static tail.
    pub fn pinned(backend: BoxGenerationBackend, call_timeout: Duration) -> Self {
        Self {
            backends: vec![backend],
            fallback_enabled: false,
            call_timeout,
            scoped: true,
        }
    }

    /// Chain scoped to a single backend, used for independent per-backend output sets.
    pub fn scoped(backend: BoxGenerationBackend, call_timeout: Duration) -> Self {
        Self::pinned(backend, call_timeout)
    }

    pub fn backends(&self) -> &[BoxGenerationBackend] {
        &self.backends
    }

    /// First backend of the chain; names the output set in single-best mode.
    pub fn head(&self) -> Option<&BoxGenerationBackend> {
        self.backends.first()
    }

    /// Backend whose text alone may fill this chain's output, if restricted.
    pub fn producer_scope(&self) -> Option<&str> {
        if self.scoped {
            self.head().map(|b| b.name())
        } else {
            None
        }
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Walk the chain for one request.
    ///
    /// On success the result's metadata records the producing backend and
    /// model. On exhaustion every failed attempt is returned, in order.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ChainExhausted> {
        let len = self.backends.len();
        let mut attempts = Vec::new();
        let mut state = ChainState::NotStarted.next(ChainEvent::Start, len, self.fallback_enabled);

        while let ChainState::Trying(index) = state {
            let backend = &self.backends[index];
            match self.attempt(backend, request).await {
                Ok(mut result) => {
                    state = state.next(ChainEvent::Success, len, self.fallback_enabled);
                    if index > 0 {
                        tracing::info!(
                            section = %request.section,
                            backend = backend.name(),
                            attempt = index + 1,
                            "Section produced by fallback backend"
                        );
                    }
                    result
                        .metadata
                        .insert(meta::BACKEND.to_string(), backend.name().into());
                    result
                        .metadata
                        .insert(meta::MODEL.to_string(), backend.model_name().into());
                    debug_assert_eq!(state, ChainState::Succeeded(index));
                    return Ok(result);
                }
                Err(err) => {
                    if err.is_transient() {
                        tracing::info!(
                            section = %request.section,
                            backend = backend.name(),
                            error = %err,
                            "Backend unavailable, advancing chain"
                        );
                    } else {
                        tracing::warn!(
                            section = %request.section,
                            backend = backend.name(),
                            error = %err,
                            "Backend failed, advancing chain"
                        );
                    }
                    attempts.push(ChainAttempt {
                        backend: backend.name().to_string(),
                        error: err,
                    });
                    state = state.next(ChainEvent::Failure, len, self.fallback_enabled);
                }
            }
        }

        let exhausted = ChainExhausted {
            section: request.section,
            attempts,
        };
        tracing::error!(
            section = %request.section,
            attempts = exhausted.attempts.len(),
            last_error = ?exhausted.last_error().map(ToString::to_string),
            "Fallback chain exhausted"
        );
        Err(exhausted)
    }

    /// One bounded backend call. A timeout is reported as `BackendError::Timeout`.
    async fn attempt(
        &self,
        backend: &BoxGenerationBackend,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, BackendError> {
        let span = tracing::info_span!(
            "gen_ai.generate",
            gen_ai.system = backend.name(),
            gen_ai.request.model = backend.model_name(),
            section = %request.section,
        );
        let start = Instant::now();

        let outcome = tokio::time::timeout(self.call_timeout, backend.generate(request))
            .instrument(span)
            .await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(result)) => {
                tracing::debug!(
                    backend = backend.name(),
                    section = %request.section,
                    elapsed_ms,
                    tokens = result.tokens_used,
                    "Backend call succeeded"
                );
                Ok(result)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(BackendError::Timeout {
                backend: backend.name().to_string(),
                after_secs: self.call_timeout.as_secs(),
            }),
        }
    }
}
