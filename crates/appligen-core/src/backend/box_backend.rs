//! BoxGenerationBackend -- object-safe dynamic dispatch wrapper for GenerationBackend.
//!
//! 1. An object-safe `GenerationBackendDyn` trait with boxed futures
//! 2. A blanket impl of `GenerationBackendDyn` for every `T: GenerationBackend`
//! 3. `BoxGenerationBackend` wraps `Arc<dyn GenerationBackendDyn>` and delegates
//!
//! The wrapper is cheap to clone so the same backend can sit in the registry,
//! in several fallback chains, and in concurrently running section tasks.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use appligen_types::backend::{BackendDescriptor, BackendKind};
use appligen_types::error::BackendError;
use appligen_types::generation::{GenerationRequest, GenerationResult};

use super::provider::GenerationBackend;

/// Object-safe version of [`GenerationBackend`] with boxed futures.
pub trait GenerationBackendDyn: Send + Sync {
    fn descriptor(&self) -> &BackendDescriptor;

    fn is_available_boxed(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, BackendError>> + Send + 'a>>;
}

impl<T: GenerationBackend> GenerationBackendDyn for T {
    fn descriptor(&self) -> &BackendDescriptor {
        GenerationBackend::descriptor(self)
    }

    fn is_available_boxed(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(self.is_available())
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResult, BackendError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }
}

/// Type-erased generation backend for configuration-driven selection.
///
/// Since `GenerationBackend` uses RPITIT it cannot be a trait object directly;
/// this wrapper exposes the same operations through `GenerationBackendDyn`.
#[derive(Clone)]
pub struct BoxGenerationBackend {
    inner: Arc<dyn GenerationBackendDyn>,
}

impl BoxGenerationBackend {
    pub fn new<T: GenerationBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    pub fn descriptor(&self) -> &BackendDescriptor {
        self.inner.descriptor()
    }

    pub fn name(&self) -> &str {
        &self.inner.descriptor().name
    }

    pub fn kind(&self) -> BackendKind {
        self.inner.descriptor().kind
    }

    pub fn priority(&self) -> u32 {
        self.inner.descriptor().priority
    }

    pub fn model_name(&self) -> &str {
        &self.inner.descriptor().model
    }

    pub async fn is_available(&self) -> bool {
        self.inner.is_available_boxed().await
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, BackendError> {
        self.inner.generate_boxed(request).await
    }
}

impl fmt::Debug for BoxGenerationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxGenerationBackend")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("model", &self.model_name())
            .finish()
    }
}
