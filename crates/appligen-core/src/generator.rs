//! Section generator.
//!
//! Produces one complete [`RunOutputSet`] for one fallback chain: every
//! required section is looked up in the cache and, on a miss, generated
//! through the chain and stored. Sections are generated concurrently and
//! fail independently; an exhausted section gets a placeholder so the
//! renderer always sees every key.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;

use appligen_types::error::ChainExhausted;
use appligen_types::generation::{
    ApplicationInputs, GenerationRequest, GenerationResult, RunOutputSet, meta,
};
use appligen_types::section::SectionType;

use crate::cache::{ContentCache, SectionCache};
use crate::fallback::FallbackChain;

pub struct SectionGenerator<C> {
    cache: Arc<SectionCache<C>>,
}

impl<C> Clone for SectionGenerator<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C: ContentCache> SectionGenerator<C> {
    pub fn new(cache: Arc<SectionCache<C>>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SectionCache<C>> {
        &self.cache
    }

    /// Generate `sections` for `inputs` through `chain`.
    ///
    /// The output set is named after the chain head, or, for an unscoped
    /// chain, after the one backend that produced every section. Never fails
    /// as a whole: check [`RunOutputSet::is_partial_failure`] for exhausted
    /// sections.
    pub async fn generate_all_sections(
        &self,
        chain: &FallbackChain,
        inputs: &ApplicationInputs,
        sections: &[SectionType],
    ) -> RunOutputSet {
        let (head_name, head_model) = chain
            .head()
            .map(|b| (b.name().to_string(), b.model_name().to_string()))
            .unwrap_or_default();

        tracing::info!(
            backend = %head_name,
            model = %head_model,
            sections = sections.len(),
            "Generating sections"
        );

        let tasks = sections.iter().map(|&section| {
            let request = GenerationRequest::for_section(section, inputs);
            async move {
                let outcome = self.generate_section(chain, &request).await;
                (section, outcome)
            }
        });

        let mut results = BTreeMap::new();
        let mut failed_sections = Vec::new();
        for (section, outcome) in join_all(tasks).await {
            let result = match outcome {
                Ok(result) => result,
                Err(exhausted) => {
                    failed_sections.push(section);
                    let reason = exhausted
                        .last_error()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| exhausted.to_string());
                    GenerationResult::placeholder(section, &reason)
                }
            };
            results.insert(section, result);
        }

        let (backend_name, model_identifier) = match chain.producer_scope() {
            Some(_) => (head_name, head_model),
            None => sole_producer(&results).unwrap_or((head_name, head_model)),
        };

        let output = RunOutputSet {
            backend_name,
            model_identifier,
            sections: results,
            failed_sections,
            generated_at: Utc::now(),
        };

        if output.is_partial_failure() {
            tracing::warn!(
                backend = %output.backend_name,
                failed = output.failed_sections.len(),
                "Output set is incomplete"
            );
        } else {
            tracing::info!(
                backend = %output.backend_name,
                cached = output.cached_count(),
                tokens = output.total_tokens(),
                "Output set complete"
            );
        }
        output
    }

    /// One section: cache first, then the chain, then store on success.
    pub async fn generate_section(
        &self,
        chain: &FallbackChain,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ChainExhausted> {
        self.cache
            .get_or_generate_as(request, chain.producer_scope(), || chain.generate(request))
            .await
    }
}

/// Backend and model behind every result, if they are all the same one.
fn sole_producer(results: &BTreeMap<SectionType, GenerationResult>) -> Option<(String, String)> {
    let mut producers = results.values().map(|r| {
        (
            r.produced_by(),
            r.metadata.get(meta::MODEL).and_then(|v| v.as_str()),
        )
    });
    let (Some(backend), Some(model)) = producers.next()? else {
        return None;
    };
    producers
        .all(|p| p == (Some(backend), Some(model)))
        .then(|| (backend.to_string(), model.to_string()))
}
