//! Section catalogue for generated application content.
//!
//! A [`SectionType`] names one block of text the document templates need.
//! The string keys are the template variable names consumed by the renderer,
//! so they are part of the output contract and must not change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named content section required by the cover letter or CV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionType {
    /// Personalised opening paragraph of the cover letter.
    #[serde(rename = "einstiegstext")]
    Opening,
    /// How the applicant's skills match the posting's requirements.
    #[serde(rename = "fachliche_passung")]
    QualificationsMatch,
    /// Motivation for this role and company.
    #[serde(rename = "motivationstext")]
    Motivation,
    /// What the applicant brings to the company.
    #[serde(rename = "mehrwert")]
    ValueProposition,
    /// Closing paragraph of the cover letter.
    #[serde(rename = "abschlusstext")]
    Closing,
    /// Professional experience rewritten for the posting.
    #[serde(rename = "berufserfahrung_enhanced")]
    ExperienceEnhanced,
    /// Education section highlighting relevant parts.
    #[serde(rename = "ausbildung_enhanced")]
    EducationEnhanced,
    /// Technical skills grouped by relevance.
    #[serde(rename = "fachkenntnisse_enhanced")]
    SkillsEnhanced,
}

/// Output format a section is expected to be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionFormat {
    Plain,
    Markdown,
}

/// Soft length/tone guidance handed to backends through the request context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionGuidance {
    pub description: &'static str,
    /// Maximum character count, if the section has one.
    pub max_length: Option<usize>,
    pub tone: &'static str,
    pub format: SectionFormat,
}

impl SectionType {
    /// Cover letter sections, in document order.
    pub const COVER_LETTER: [SectionType; 5] = [
        SectionType::Opening,
        SectionType::QualificationsMatch,
        SectionType::Motivation,
        SectionType::ValueProposition,
        SectionType::Closing,
    ];

    /// CV enhancement sections, in document order.
    pub const CV: [SectionType; 3] = [
        SectionType::ExperienceEnhanced,
        SectionType::EducationEnhanced,
        SectionType::SkillsEnhanced,
    ];

    /// Every section, cover letter first.
    pub const ALL: [SectionType; 8] = [
        SectionType::Opening,
        SectionType::QualificationsMatch,
        SectionType::Motivation,
        SectionType::ValueProposition,
        SectionType::Closing,
        SectionType::ExperienceEnhanced,
        SectionType::EducationEnhanced,
        SectionType::SkillsEnhanced,
    ];

    /// Template variable name for this section.
    pub fn key(&self) -> &'static str {
        match self {
            SectionType::Opening => "einstiegstext",
            SectionType::QualificationsMatch => "fachliche_passung",
            SectionType::Motivation => "motivationstext",
            SectionType::ValueProposition => "mehrwert",
            SectionType::Closing => "abschlusstext",
            SectionType::ExperienceEnhanced => "berufserfahrung_enhanced",
            SectionType::EducationEnhanced => "ausbildung_enhanced",
            SectionType::SkillsEnhanced => "fachkenntnisse_enhanced",
        }
    }

    pub fn is_cover_letter(&self) -> bool {
        Self::COVER_LETTER.contains(self)
    }

    pub fn guidance(&self) -> SectionGuidance {
        match self {
            SectionType::Opening => SectionGuidance {
                description: "Personalised opening paragraph for the cover letter",
                max_length: Some(300),
                tone: "professional, enthusiastic",
                format: SectionFormat::Plain,
            },
            SectionType::QualificationsMatch => SectionGuidance {
                description: "Match between the applicant's skills and the job requirements",
                max_length: Some(500),
                tone: "confident, specific",
                format: SectionFormat::Plain,
            },
            SectionType::Motivation => SectionGuidance {
                description: "Motivation for the specific role and company",
                max_length: Some(400),
                tone: "passionate, forward-looking",
                format: SectionFormat::Plain,
            },
            SectionType::ValueProposition => SectionGuidance {
                description: "What the applicant brings to the company",
                max_length: Some(300),
                tone: "value-focused, results-oriented",
                format: SectionFormat::Plain,
            },
            SectionType::Closing => SectionGuidance {
                description: "Professional closing paragraph",
                max_length: Some(150),
                tone: "polite, professional",
                format: SectionFormat::Plain,
            },
            SectionType::ExperienceEnhanced => SectionGuidance {
                description: "Professional experience tailored to the job requirements",
                max_length: None,
                tone: "achievement-focused, quantified",
                format: SectionFormat::Markdown,
            },
            SectionType::EducationEnhanced => SectionGuidance {
                description: "Education section highlighting relevant aspects",
                max_length: None,
                tone: "academic, relevant",
                format: SectionFormat::Markdown,
            },
            SectionType::SkillsEnhanced => SectionGuidance {
                description: "Technical skills organised by relevance to the job",
                max_length: None,
                tone: "technical, categorised",
                format: SectionFormat::Markdown,
            },
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionType::ALL
            .iter()
            .copied()
            .find(|section| section.key() == s.trim().to_lowercase())
            .ok_or_else(|| format!("invalid section: '{s}'"))
    }
}

/// Which group of sections a run must produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionSet {
    /// The five cover letter sections.
    #[default]
    CoverLetter,
    /// Cover letter plus CV enhancement sections.
    Full,
}

impl SectionSet {
    pub fn sections(&self) -> Vec<SectionType> {
        match self {
            SectionSet::CoverLetter => SectionType::COVER_LETTER.to_vec(),
            SectionSet::Full => SectionType::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_key_roundtrip() {
        for section in SectionType::ALL {
            let parsed: SectionType = section.key().parse().unwrap();
            assert_eq!(parsed, section);
        }
    }

    #[test]
    fn test_section_serde_uses_template_key() {
        let json = serde_json::to_string(&SectionType::ValueProposition).unwrap();
        assert_eq!(json, "\"mehrwert\"");
        let parsed: SectionType = serde_json::from_str("\"abschlusstext\"").unwrap();
        assert_eq!(parsed, SectionType::Closing);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!("anrede".parse::<SectionType>().is_err());
    }

    #[test]
    fn test_cover_letter_guidance_has_length_limits() {
        for section in SectionType::COVER_LETTER {
            let guidance = section.guidance();
            assert!(guidance.max_length.is_some(), "{section} has no max length");
            assert_eq!(guidance.format, SectionFormat::Plain);
        }
        assert_eq!(SectionType::Closing.guidance().max_length, Some(150));
    }

    #[test]
    fn test_cv_sections_are_markdown() {
        for section in SectionType::CV {
            assert!(!section.is_cover_letter());
            assert_eq!(section.guidance().format, SectionFormat::Markdown);
        }
    }

    #[test]
    fn test_section_set_sizes() {
        assert_eq!(SectionSet::CoverLetter.sections().len(), 5);
        assert_eq!(SectionSet::Full.sections().len(), 8);
        assert_eq!(SectionSet::default(), SectionSet::CoverLetter);
    }
}
