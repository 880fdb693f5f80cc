//! GenerationBackend trait definition.
//!
//! The capability interface every content source implements: a liveness
//! probe, a display model name, and single-section generation.

use appligen_types::backend::{BackendDescriptor, BackendKind};
use appligen_types::error::BackendError;
use appligen_types::generation::{GenerationRequest, GenerationResult};

/// Trait for content generation backends (local model service, hosted API,
/// built-in static content).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Implementations
/// hold no shared mutable state, so `generate` can be called concurrently for
/// different requests.
///
/// HTTP-backed implementations live in appligen-infra.
pub trait GenerationBackend: Send + Sync {
    /// Name, kind, fallback priority and model of this backend.
    fn descriptor(&self) -> &BackendDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn kind(&self) -> BackendKind {
        self.descriptor().kind
    }

    fn priority(&self) -> u32 {
        self.descriptor().priority
    }

    /// Model identifier shown to operators and used in output folder names.
    fn model_name(&self) -> &str {
        &self.descriptor().model
    }

    /// Cheap, side-effect-free liveness check.
    fn is_available(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Produce text for one section.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<GenerationResult, BackendError>> + Send;
}
