//! OpenTelemetry GenAI semantic convention names.
//!
//! Backend call spans declare these fields up front (usage fields as
//! `tracing::field::Empty`) and fill them with `Span::record`, which takes the
//! field name as a string, so the constants below are the single source of
//! truth for the names.

/// The name of the operation being performed.
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "ollama", "anthropic").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

/// The number of input (prompt) tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// Why generation stopped (e.g., "end_turn", "stop", "length").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

// --- Operation name values ---

/// Single-section text generation.
pub const OP_GENERATE_SECTION: &str = "generate_section";

/// Availability probe.
pub const OP_PROBE: &str = "probe";

// --- Provider name values ---

pub const PROVIDER_OLLAMA: &str = "ollama";

pub const PROVIDER_ANTHROPIC: &str = "anthropic";
