//! Side-by-side comparison of output sets from one run.

use serde::{Deserialize, Serialize};

use appligen_types::generation::RunReport;
use appligen_types::section::SectionType;

const PREVIEW_CHARS: usize = 80;

/// One backend's text for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// `{backend}_{model}` folder name of the output set.
    pub output_set: String,
    pub char_count: usize,
    pub word_count: usize,
    pub preview: String,
    pub from_cache: bool,
    /// Backend that originally produced the text, when it differs from the output set's.
    pub produced_by: Option<String>,
    pub failed: bool,
}

/// All variants of one section plus length ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionComparison {
    pub section: SectionType,
    pub variants: Vec<Variant>,
    pub min_chars: usize,
    pub max_chars: usize,
    pub avg_chars: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub avg_words: usize,
}

/// Compare every section across the output sets of `report`, in section order.
pub fn compare_variants(report: &RunReport) -> Vec<SectionComparison> {
    let mut sections: Vec<SectionType> = report
        .outputs
        .values()
        .flat_map(|output| output.sections.keys().copied())
        .collect();
    sections.sort();
    sections.dedup();

    sections
        .into_iter()
        .map(|section| {
            let variants: Vec<Variant> = report
                .outputs
                .values()
                .filter_map(|output| {
                    let result = output.sections.get(&section)?;
                    let text = result.generated_text.trim();
                    let produced_by = result
                        .produced_by()
                        .filter(|name| *name != output.backend_name)
                        .map(str::to_string);
                    Some(Variant {
                        output_set: output.folder_name(),
                        char_count: text.chars().count(),
                        word_count: text.split_whitespace().count(),
                        preview: preview(text),
                        from_cache: result.from_cache(),
                        produced_by,
                        failed: output.failed_sections.contains(&section),
                    })
                })
                .collect();
            summarize(section, variants)
        })
        .collect()
}

fn summarize(section: SectionType, variants: Vec<Variant>) -> SectionComparison {
    let chars: Vec<usize> = variants.iter().map(|v| v.char_count).collect();
    let words: Vec<usize> = variants.iter().map(|v| v.word_count).collect();
    let (min_chars, max_chars, avg_chars) = range(&chars);
    let (min_words, max_words, avg_words) = range(&words);
    SectionComparison {
        section,
        variants,
        min_chars,
        max_chars,
        avg_chars,
        min_words,
        max_words,
        avg_words,
    }
}

fn range(values: &[usize]) -> (usize, usize, usize) {
    if values.is_empty() {
        return (0, 0, 0);
    }
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    (min, max, values.iter().sum::<usize>() / values.len())
}

/// Whitespace-collapsed text cut to `PREVIEW_CHARS` characters, with an ellipsis if cut.
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS - 1).collect();
        format!("{}…", cut.trim_end())
    }
}
