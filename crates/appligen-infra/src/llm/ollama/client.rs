//! OllamaBackend -- [`GenerationBackend`] for a locally hosted Ollama server.
//!
//! Availability means the server answers `GET /api/tags` AND the configured
//! model is installed. Generation uses the non-streaming `POST /api/generate`
//! endpoint with the prompt wrapped in the Llama chat template.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::Instrument;

use appligen_core::backend::GenerationBackend;
use appligen_observe::genai_attrs;
use appligen_types::backend::{BackendDescriptor, BackendKind};
use appligen_types::config::LocalBackendConfig;
use appligen_types::error::BackendError;
use appligen_types::generation::{GenerationRequest, GenerationResult, meta};

use super::types::{OllamaGenerateRequest, OllamaGenerateResponse, OllamaOptions, OllamaTagsResponse};
use crate::llm::classify_status;
use crate::llm::prompts::{SYSTEM_PROMPT, llama_chat_prompt, section_prompt};

/// Registry name of the local backend.
pub const LOCAL_BACKEND_NAME: &str = "local";

const CONFIDENCE: f64 = 0.8;

/// Local Llama models served by Ollama.
pub struct OllamaBackend {
    client: reqwest::Client,
    descriptor: BackendDescriptor,
    host: String,
    temperature: f64,
    max_tokens: u32,
    probe_timeout: Duration,
}

impl OllamaBackend {
    pub fn new(config: &LocalBackendConfig, probe_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // outer bound; the fallback chain applies the call timeout
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            descriptor: BackendDescriptor {
                name: LOCAL_BACKEND_NAME.to_string(),
                kind: BackendKind::Local,
                priority: config.priority,
                model: config.model.clone(),
            },
            host: config.host.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            probe_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    fn to_ollama_request(&self, request: &GenerationRequest) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: self.descriptor.model.clone(),
            prompt: llama_chat_prompt(SYSTEM_PROMPT, &section_prompt(request)),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        }
    }

    /// True when `installed` names the configured model. A bare model name
    /// matches its `:latest` tag.
    fn model_installed(&self, installed: &OllamaTagsResponse) -> bool {
        let wanted = self.descriptor.model.as_str();
        installed.models.iter().any(|m| {
            m.name == wanted || (!wanted.contains(':') && m.name == format!("{wanted}:latest"))
        })
    }

    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, BackendError> {
        let start = Instant::now();
        let name = self.descriptor.name.as_str();
        let body = self.to_ollama_request(request);

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::unavailable(name, format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(name, status.as_u16(), &error_body));
        }

        let ollama_resp: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::failed(name, format!("failed to parse response: {e}")))?;

        let result = to_result(request, ollama_resp, start.elapsed().as_secs_f64())
            .ok_or_else(|| BackendError::failed(name, "empty response"))?;

        let span = tracing::Span::current();
        if let Some(input) = result.metadata.get(meta::INPUT_TOKENS).and_then(|v| v.as_u64()) {
            span.record(genai_attrs::GEN_AI_USAGE_INPUT_TOKENS, input);
        }
        if let Some(output) = result.metadata.get(meta::OUTPUT_TOKENS).and_then(|v| v.as_u64()) {
            span.record(genai_attrs::GEN_AI_USAGE_OUTPUT_TOKENS, output);
        }
        Ok(result)
    }
}

/// Build a result from an Ollama response. `None` when the text is empty.
///
/// Token usage comes from the eval counters; older servers omit them, in
/// which case the word count stands in.
fn to_result(
    request: &GenerationRequest,
    response: OllamaGenerateResponse,
    processing_time: f64,
) -> Option<GenerationResult> {
    let text = response.response.trim();
    if text.is_empty() {
        return None;
    }

    let mut metadata = BTreeMap::new();
    let tokens_used = match (response.prompt_eval_count, response.eval_count) {
        (None, None) => text.split_whitespace().count() as u64,
        (input, output) => {
            let input = input.unwrap_or(0);
            let output = output.unwrap_or(0);
            metadata.insert(meta::INPUT_TOKENS.to_string(), input.into());
            metadata.insert(meta::OUTPUT_TOKENS.to_string(), output.into());
            input + output
        }
    };
    if let Some(reason) = response.done_reason {
        metadata.insert("finish_reason".to_string(), reason.into());
    }

    Some(GenerationResult {
        section: request.section,
        generated_text: text.to_string(),
        confidence: CONFIDENCE,
        tokens_used,
        processing_time,
        metadata,
    })
}

impl std::fmt::Debug for OllamaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaBackend")
            .field("host", &self.host)
            .field("model", &self.descriptor.model)
            .field("priority", &self.descriptor.priority)
            .finish()
    }
}

impl GenerationBackend for OllamaBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    async fn is_available(&self) -> bool {
        let response = match self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(host = %self.host, status = %response.status(), "Ollama not responding");
                return false;
            }
            Err(e) => {
                tracing::debug!(host = %self.host, error = %e, "Ollama not reachable");
                return false;
            }
        };

        match response.json::<OllamaTagsResponse>().await {
            Ok(tags) => {
                let installed = self.model_installed(&tags);
                if !installed {
                    tracing::info!(
                        model = %self.descriptor.model,
                        "Model not installed in Ollama (ollama pull {})",
                        self.descriptor.model
                    );
                }
                installed
            }
            Err(e) => {
                tracing::debug!(error = %e, "Failed to parse Ollama model list");
                false
            }
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, BackendError> {
        let span = tracing::info_span!(
            "gen_ai.ollama.generate",
            gen_ai.operation.name = genai_attrs::OP_GENERATE_SECTION,
            gen_ai.provider.name = genai_attrs::PROVIDER_OLLAMA,
            gen_ai.request.model = %self.descriptor.model,
            gen_ai.request.temperature = self.temperature,
            gen_ai.request.max_tokens = self.max_tokens,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );
        self.send(request).instrument(span).await
    }
}
