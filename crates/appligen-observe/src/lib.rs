//! Observability for the application content generator.
//!
//! - `tracing_setup`: global subscriber with optional OpenTelemetry export
//! - `genai_attrs`: GenAI semantic-convention names for backend call spans

pub mod genai_attrs;
pub mod tracing_setup;
