//! Request/result types for section generation.
//!
//! These model the data that flows between the section generator, the
//! fallback chain, the backends and the content cache, plus the per-backend
//! output set handed to the renderer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::section::SectionType;

/// Well-known keys in [`GenerationResult::metadata`].
pub mod meta {
    /// `true` when the result was served from the content cache.
    pub const FROM_CACHE: &str = "from_cache";
    /// Name of the backend that produced the text.
    pub const BACKEND: &str = "backend";
    /// Model identifier of the backend that produced the text.
    pub const MODEL: &str = "model";
    /// Last error seen for a section whose chain was exhausted.
    pub const ERROR: &str = "error";
    pub const INPUT_TOKENS: &str = "input_tokens";
    pub const OUTPUT_TOKENS: &str = "output_tokens";
}

/// Already-extracted inputs for one generation run.
///
/// Discovering and reading the profile/posting files is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInputs {
    pub profile_text: String,
    pub job_text: String,
    pub company_name: String,
    pub position_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

/// One request for one section. Equal field values mean an equal fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub section: SectionType,
    pub job_description: String,
    pub profile: String,
    pub company_name: String,
    pub position_title: String,
    /// Extra guidance (max length, tone, format). Ordered so that
    /// serialisation is canonical.
    #[serde(default)]
    pub additional_context: BTreeMap<String, serde_json::Value>,
}

impl GenerationRequest {
    /// Build a request for `section`, carrying the section's length/tone guidance.
    pub fn for_section(section: SectionType, inputs: &ApplicationInputs) -> Self {
        let guidance = section.guidance();
        let mut additional_context = BTreeMap::new();
        if let Some(max_length) = guidance.max_length {
            additional_context.insert("max_length".to_string(), max_length.into());
        }
        additional_context.insert("tone".to_string(), guidance.tone.into());
        additional_context.insert(
            "format".to_string(),
            serde_json::to_value(guidance.format).unwrap_or(serde_json::Value::Null),
        );

        Self {
            section,
            job_description: inputs.job_text.clone(),
            profile: inputs.profile_text.clone(),
            company_name: inputs.company_name.clone(),
            position_title: inputs.position_title.clone(),
            additional_context,
        }
    }

    /// Max character count requested via the context, if any.
    pub fn max_length(&self) -> Option<usize> {
        self.additional_context
            .get("max_length")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    }

    pub fn tone(&self) -> Option<&str> {
        self.additional_context.get("tone").and_then(|v| v.as_str())
    }
}

/// Text produced for one section, by a backend or from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(rename = "section_type")]
    pub section: SectionType,
    pub generated_text: String,
    /// 0.0 to 1.0, backend-reported or synthetic.
    pub confidence: f64,
    pub tokens_used: u64,
    /// Wall-clock seconds spent producing the text.
    pub processing_time: f64,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl GenerationResult {
    pub fn from_cache(&self) -> bool {
        self.metadata
            .get(meta::FROM_CACHE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Backend that originally produced this text, if recorded.
    pub fn produced_by(&self) -> Option<&str> {
        self.metadata.get(meta::BACKEND).and_then(|v| v.as_str())
    }

    /// Placeholder stored in an output set when no backend could produce a section.
    pub fn placeholder(section: SectionType, error: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(meta::ERROR.to_string(), error.into());
        metadata.insert(meta::FROM_CACHE.to_string(), false.into());
        Self {
            section,
            generated_text: format!("[{}: no content generated]", section.key()),
            confidence: 0.0,
            tokens_used: 0,
            processing_time: 0.0,
            metadata,
        }
    }
}

/// Every required section produced for one backend set in one run.
///
/// Every required section has an entry in `sections`; sections whose chain
/// was exhausted hold a placeholder and are listed in `failed_sections`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutputSet {
    pub backend_name: String,
    pub model_identifier: String,
    pub sections: BTreeMap<SectionType, GenerationResult>,
    #[serde(default)]
    pub failed_sections: Vec<SectionType>,
    pub generated_at: DateTime<Utc>,
}

impl RunOutputSet {
    /// True if at least one section could not be generated by any backend.
    pub fn is_partial_failure(&self) -> bool {
        !self.failed_sections.is_empty()
    }

    /// Section-key to text mapping, the shape the template renderer consumes.
    pub fn text_mapping(&self) -> BTreeMap<String, String> {
        self.sections
            .iter()
            .map(|(section, result)| (section.key().to_string(), result.generated_text.clone()))
            .collect()
    }

    pub fn cached_count(&self) -> usize {
        self.sections.values().filter(|r| r.from_cache()).count()
    }

    pub fn total_tokens(&self) -> u64 {
        self.sections.values().map(|r| r.tokens_used).sum()
    }

    /// Filesystem-safe `{backend}_{model}` directory name.
    pub fn folder_name(&self) -> String {
        sanitize_folder_name(&format!("{}_{}", self.backend_name, self.model_identifier))
    }
}

/// Replace characters that are awkward in directory names.
pub fn sanitize_folder_name(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            ':' | '/' | '\\' | '.' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

/// Everything one coordinator invocation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Output set per backend name.
    pub outputs: BTreeMap<String, RunOutputSet>,
    /// Backends skipped because their availability probe failed.
    #[serde(default)]
    pub skipped: Vec<String>,
    /// Number of cache entries removed before the run, if a clear was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_entries_cleared: Option<usize>,
}

impl RunReport {
    pub fn any_partial_failure(&self) -> bool {
        self.outputs.values().any(RunOutputSet::is_partial_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ApplicationInputs {
        ApplicationInputs {
            profile_text: "DevOps engineer, 7 years Kubernetes".to_string(),
            job_text: "DevOps role at Acme".to_string(),
            company_name: "Acme".to_string(),
            position_title: "DevOps Engineer".to_string(),
            reference_id: None,
        }
    }

    #[test]
    fn test_request_carries_guidance() {
        let request = GenerationRequest::for_section(SectionType::Opening, &inputs());
        assert_eq!(request.max_length(), Some(300));
        assert_eq!(request.tone(), Some("professional, enthusiastic"));
        assert_eq!(request.additional_context["format"], "plain");
    }

    #[test]
    fn test_cv_request_has_no_max_length() {
        let request = GenerationRequest::for_section(SectionType::SkillsEnhanced, &inputs());
        assert_eq!(request.max_length(), None);
        assert_eq!(request.additional_context["format"], "markdown");
    }

    #[test]
    fn test_result_serializes_in_cache_shape() {
        let result = GenerationResult {
            section: SectionType::Motivation,
            generated_text: "text".to_string(),
            confidence: 0.8,
            tokens_used: 42,
            processing_time: 1.5,
            metadata: BTreeMap::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["section_type"], "motivationstext");
        assert_eq!(json["tokens_used"], 42);
        assert!(json.get("metadata").is_some());
    }

    #[test]
    fn test_placeholder_marks_error() {
        let result = GenerationResult::placeholder(SectionType::Closing, "all backends failed");
        assert!(result.generated_text.contains("abschlusstext"));
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.metadata[meta::ERROR], "all backends failed");
        assert!(!result.from_cache());
    }

    #[test]
    fn test_folder_name_sanitized() {
        let set = RunOutputSet {
            backend_name: "local".to_string(),
            model_identifier: "llama3.2:3b".to_string(),
            sections: BTreeMap::new(),
            failed_sections: Vec::new(),
            generated_at: Utc::now(),
        };
        assert_eq!(set.folder_name(), "local_llama3-2-3b");
        assert_eq!(sanitize_folder_name("a b/c\\d"), "a_b-c-d");
    }

    #[test]
    fn test_text_mapping_keys_are_template_names() {
        let mut sections = BTreeMap::new();
        sections.insert(
            SectionType::Opening,
            GenerationResult::placeholder(SectionType::Opening, "x"),
        );
        let set = RunOutputSet {
            backend_name: "static".to_string(),
            model_identifier: "content".to_string(),
            sections,
            failed_sections: vec![SectionType::Opening],
            generated_at: Utc::now(),
        };
        let mapping = set.text_mapping();
        assert!(mapping.contains_key("einstiegstext"));
        assert!(set.is_partial_failure());
    }
}
