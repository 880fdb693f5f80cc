//! AnthropicBackend -- [`GenerationBackend`] for the Anthropic Messages API.
//!
//! Sends one non-streaming request per section to `/v1/messages` with the
//! shared system prompt and the section prompt as the single user message.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use appligen_core::backend::GenerationBackend;
use appligen_observe::genai_attrs;
use appligen_types::backend::{BackendDescriptor, BackendKind};
use appligen_types::config::RemoteBackendConfig;
use appligen_types::error::BackendError;
use appligen_types::generation::{GenerationRequest, GenerationResult, meta};

use super::types::{AnthropicMessage, AnthropicRequest, AnthropicResponse};
use crate::llm::classify_status;
use crate::llm::prompts::{SYSTEM_PROMPT, section_prompt};

/// Registry name of the remote backend.
pub const REMOTE_BACKEND_NAME: &str = "remote";

/// Value shipped in example `.env` files; never a real key.
const PLACEHOLDER_KEY: &str = "your_api_key_here";

const CONFIDENCE: f64 = 0.9;

/// Anthropic Claude content backend.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers. It never appears in Debug output,
/// Display output, or tracing logs.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    descriptor: BackendDescriptor,
    base_url: String,
    temperature: f64,
    max_tokens: u32,
}

impl AnthropicBackend {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    /// Create a new Anthropic backend. `api_key` is `None` when the
    /// configured environment variable is unset.
    pub fn new(config: &RemoteBackendConfig, api_key: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // outer bound; the fallback chain applies the call timeout
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            descriptor: BackendDescriptor {
                name: REMOTE_BACKEND_NAME.to_string(),
                kind: BackendKind::Remote,
                priority: config.priority,
                model: config.model.clone(),
            },
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The key, if it looks usable: present, not the placeholder, `sk-` prefix.
    fn usable_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|key| {
            let raw = key.expose_secret().trim();
            !raw.is_empty() && raw != PLACEHOLDER_KEY && raw.starts_with("sk-")
        })
    }

    fn to_anthropic_request(&self, request: &GenerationRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: self.descriptor.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: section_prompt(request),
            }],
            system: Some(SYSTEM_PROMPT.to_string()),
            temperature: Some(self.temperature),
        }
    }

    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, BackendError> {
        let name = self.descriptor.name.as_str();
        let api_key = self
            .usable_key()
            .ok_or_else(|| BackendError::unavailable(name, "no valid API key configured"))?;

        let start = Instant::now();
        let body = self.to_anthropic_request(request);

        let response = self
            .client
            .post(self.url("/v1/messages"))
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::unavailable(name, format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(name, status.as_u16(), &error_body));
        }

        let anthropic_resp: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| BackendError::failed(name, format!("failed to parse response: {e}")))?;

        let span = tracing::Span::current();
        span.record(
            genai_attrs::GEN_AI_USAGE_INPUT_TOKENS,
            anthropic_resp.usage.input_tokens,
        );
        span.record(
            genai_attrs::GEN_AI_USAGE_OUTPUT_TOKENS,
            anthropic_resp.usage.output_tokens,
        );
        if let Some(reason) = &anthropic_resp.stop_reason {
            span.record(genai_attrs::GEN_AI_RESPONSE_FINISH_REASONS, reason.as_str());
        }

        to_result(request, &anthropic_resp, start.elapsed().as_secs_f64())
            .ok_or_else(|| BackendError::failed(name, "empty response"))
    }
}

/// Build a result from an Anthropic response. `None` when no text came back.
fn to_result(
    request: &GenerationRequest,
    response: &AnthropicResponse,
    processing_time: f64,
) -> Option<GenerationResult> {
    let text = response.text();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut metadata = BTreeMap::new();
    metadata.insert(meta::INPUT_TOKENS.to_string(), response.usage.input_tokens.into());
    metadata.insert(meta::OUTPUT_TOKENS.to_string(), response.usage.output_tokens.into());
    metadata.insert("response_id".to_string(), response.id.clone().into());
    metadata.insert("response_model".to_string(), response.model.clone().into());

    Some(GenerationResult {
        section: request.section,
        generated_text: text.to_string(),
        confidence: CONFIDENCE,
        tokens_used: response.usage.input_tokens + response.usage.output_tokens,
        processing_time,
        metadata,
    })
}

// AnthropicBackend does NOT derive Debug. The manual impl below omits the
// key field entirely.
impl std::fmt::Debug for AnthropicBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.descriptor.model)
            .field("has_key", &self.api_key.is_some())
            .finish()
    }
}

impl GenerationBackend for AnthropicBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    /// Credential check only. No request is sent.
    async fn is_available(&self) -> bool {
        let available = self.usable_key().is_some();
        if !available {
            tracing::debug!(
                has_key = self.api_key.is_some(),
                "Anthropic API key missing or not usable"
            );
        }
        available
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, BackendError> {
        let span = tracing::info_span!(
            "gen_ai.anthropic.generate",
            gen_ai.operation.name = genai_attrs::OP_GENERATE_SECTION,
            gen_ai.provider.name = genai_attrs::PROVIDER_ANTHROPIC,
            gen_ai.request.model = %self.descriptor.model,
            gen_ai.request.temperature = self.temperature,
            gen_ai.request.max_tokens = self.max_tokens,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
        );
        self.send(request).instrument(span).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::anthropic::types::{AnthropicContentBlock, AnthropicUsage};
    use appligen_types::generation::ApplicationInputs;
    use appligen_types::section::SectionType;

    fn make_backend(key: Option<&str>) -> AnthropicBackend {
        AnthropicBackend::new(
            &RemoteBackendConfig::default(),
            key.map(SecretString::from),
        )
    }

    fn request() -> GenerationRequest {
        let inputs = ApplicationInputs {
            profile_text: "7 Jahre Kubernetes".to_string(),
            job_text: "DevOps role at Acme".to_string(),
            company_name: "Acme".to_string(),
            position_title: "DevOps Engineer".to_string(),
            reference_id: None,
        };
        GenerationRequest::for_section(SectionType::Opening, &inputs)
    }

    fn response(blocks: Vec<AnthropicContentBlock>) -> AnthropicResponse {
        AnthropicResponse {
            id: "msg_01".to_string(),
            content: blocks,
            model: "claude-3-5-sonnet-20241022".to_string(),
            stop_reason: Some("end_turn".to_string()),
            usage: AnthropicUsage {
                input_tokens: 300,
                output_tokens: 60,
            },
        }
    }

    #[test]
    fn test_descriptor() {
        let backend = make_backend(None);
        assert_eq!(backend.name(), "remote");
        assert_eq!(backend.kind(), BackendKind::Remote);
        assert_eq!(backend.model_name(), "claude-3-5-sonnet-20241022");
        assert_eq!(backend.priority(), 1);
    }

    #[tokio::test]
    async fn test_availability_by_credential() {
        assert!(make_backend(Some("sk-ant-test-key")).is_available().await);
        assert!(!make_backend(None).is_available().await);
        assert!(!make_backend(Some("")).is_available().await);
        assert!(!make_backend(Some("your_api_key_here")).is_available().await);
        assert!(!make_backend(Some("test-key-not-real")).is_available().await);
    }

    #[tokio::test]
    async fn test_generate_without_key_is_unavailable() {
        let backend = make_backend(None);
        let err = backend.generate(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn test_to_anthropic_request() {
        let backend = make_backend(Some("sk-ant-test"));
        let body = backend.to_anthropic_request(&request());
        assert_eq!(body.model, "claude-3-5-sonnet-20241022");
        assert_eq!(body.max_tokens, 1000);
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert!(body.messages[0].content.contains("DevOps role at Acme"));
        assert_eq!(body.system.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(body.temperature, Some(0.3));
    }

    #[test]
    fn test_base_url_override() {
        let backend = make_backend(None).with_base_url("http://localhost:8080".to_string());
        assert_eq!(backend.url("/v1/messages"), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_to_result_sums_usage() {
        let resp = response(vec![AnthropicContentBlock::Text {
            text: " Mit großem Interesse bewerbe ich mich. ".to_string(),
        }]);
        let result = to_result(&request(), &resp, 2.0).unwrap();
        assert_eq!(result.generated_text, "Mit großem Interesse bewerbe ich mich.");
        assert_eq!(result.tokens_used, 360);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.metadata[meta::INPUT_TOKENS], 300);
    }

    #[test]
    fn test_to_result_rejects_empty_text() {
        let resp = response(vec![AnthropicContentBlock::Other]);
        assert!(to_result(&request(), &resp, 2.0).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_unavailable() {
        let backend =
            make_backend(Some("sk-ant-test")).with_base_url("http://127.0.0.1:1".to_string());
        let err = backend.generate(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable { .. }));
    }

    #[test]
    fn test_debug_hides_key() {
        let backend = make_backend(Some("sk-ant-secret-value"));
        let debug = format!("{backend:?}");
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("has_key: true"));
    }
}
