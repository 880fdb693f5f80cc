//! Built-in static content backend.
//!
//! Terminal entry of every automatic fallback chain. Fills a fixed German
//! text per section with the request's company and position, so a run always
//! produces something the renderer can use.

use std::collections::BTreeMap;
use std::time::Instant;

use appligen_types::backend::{BackendDescriptor, BackendKind};
use appligen_types::error::BackendError;
use appligen_types::generation::{GenerationRequest, GenerationResult, meta};
use appligen_types::section::SectionType;

use super::provider::GenerationBackend;

pub const STATIC_BACKEND_NAME: &str = "static";
const STATIC_MODEL: &str = "content";

/// Backend that never fails and is always available.
#[derive(Debug, Clone)]
pub struct StaticBackend {
    descriptor: BackendDescriptor,
}

impl StaticBackend {
    pub fn new() -> Self {
        Self {
            descriptor: BackendDescriptor {
                name: STATIC_BACKEND_NAME.to_string(),
                kind: BackendKind::Static,
                priority: u32::MAX,
                model: STATIC_MODEL.to_string(),
            },
        }
    }

    fn render(request: &GenerationRequest) -> String {
        let company = non_empty(&request.company_name, "Ihr Unternehmen");
        let position = non_empty(&request.position_title, "die ausgeschriebene Position");

        match request.section {
            SectionType::Opening => format!(
                "mit großem Interesse habe ich Ihre Ausschreibung für {position} gelesen. \
                 Die Aufgaben bei {company} passen sehr gut zu meinem beruflichen Werdegang \
                 und zu dem, was ich als Nächstes erreichen möchte."
            ),
            SectionType::QualificationsMatch => format!(
                "Meine bisherigen Stationen haben mich genau auf die Anforderungen vorbereitet, \
                 die Sie für {position} beschreiben. Ich arbeite seit Jahren an vergleichbaren \
                 Aufgaben und habe die geforderten Werkzeuge im produktiven Einsatz verantwortet."
            ),
            SectionType::Motivation => format!(
                "An {company} reizt mich besonders die Möglichkeit, in einem engagierten Team \
                 an Lösungen mit echter Wirkung zu arbeiten. Ich möchte meine Erfahrung dort \
                 einbringen, wo sie den größten Unterschied macht."
            ),
            SectionType::ValueProposition => format!(
                "Ich bringe strukturierte Arbeitsweise, Verlässlichkeit und messbare Erfolge \
                 aus früheren Projekten mit. Diese Erfahrung möchte ich nutzen, um {company} \
                 bei den anstehenden Vorhaben schnell zu unterstützen."
            ),
            SectionType::Closing => {
                "Über die Gelegenheit, mich in einem persönlichen Gespräch vorzustellen, \
                 würde ich mich sehr freuen."
                    .to_string()
            }
            SectionType::ExperienceEnhanced => format!(
                "### Berufserfahrung\n\n\
                 - Verantwortung für Aufgaben mit direktem Bezug zu {position}\n\
                 - Kontinuierliche Verbesserung von Abläufen und Qualität\n\
                 - Enge Zusammenarbeit mit Fachbereichen und Teams"
            ),
            SectionType::EducationEnhanced => "### Ausbildung\n\n\
                 - Abschluss mit fachlichem Schwerpunkt passend zur Stelle\n\
                 - Laufende Weiterbildung und Zertifizierungen"
                .to_string(),
            SectionType::SkillsEnhanced => "### Fachkenntnisse\n\n\
                 - **Kernkompetenzen:** Analyse, Umsetzung, Betrieb\n\
                 - **Arbeitsweise:** agil, dokumentiert, teamorientiert"
                .to_string(),
        }
    }
}

impl Default for StaticBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

impl GenerationBackend for StaticBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, BackendError> {
        let start = Instant::now();
        let generated_text = Self::render(request);

        let mut metadata = BTreeMap::new();
        metadata.insert(meta::BACKEND.to_string(), STATIC_BACKEND_NAME.into());
        metadata.insert(meta::MODEL.to_string(), STATIC_MODEL.into());

        Ok(GenerationResult {
            section: request.section,
            generated_text,
            confidence: 0.5,
            tokens_used: 0,
            processing_time: start.elapsed().as_secs_f64(),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appligen_types::generation::ApplicationInputs;

    fn inputs(company: &str) -> ApplicationInputs {
        ApplicationInputs {
            profile_text: "profile".to_string(),
            job_text: "DevOps role at Acme".to_string(),
            company_name: company.to_string(),
            position_title: "DevOps Engineer".to_string(),
            reference_id: None,
        }
    }

    #[tokio::test]
    async fn test_static_backend_covers_every_section() {
        let backend = StaticBackend::new();
        assert!(backend.is_available().await);

        for section in SectionType::ALL {
            let request = GenerationRequest::for_section(section, &inputs("Acme"));
            let result = backend.generate(&request).await.unwrap();
            assert_eq!(result.section, section);
            assert!(!result.generated_text.trim().is_empty());
            assert_eq!(result.produced_by(), Some("static"));
        }
    }

    #[tokio::test]
    async fn test_static_backend_uses_company_name() {
        let backend = StaticBackend::new();
        let request = GenerationRequest::for_section(SectionType::Motivation, &inputs("Acme"));
        let result = backend.generate(&request).await.unwrap();
        assert!(result.generated_text.contains("Acme"));
    }

    #[tokio::test]
    async fn test_static_backend_defaults_blank_company() {
        let backend = StaticBackend::new();
        let request = GenerationRequest::for_section(SectionType::Motivation, &inputs("  "));
        let result = backend.generate(&request).await.unwrap();
        assert!(result.generated_text.contains("Ihr Unternehmen"));
    }

    #[test]
    fn test_static_backend_is_last_priority() {
        let backend = StaticBackend::new();
        assert_eq!(backend.priority(), u32::MAX);
        assert_eq!(backend.kind(), BackendKind::Static);
        assert_eq!(backend.model_name(), "content");
    }
}
