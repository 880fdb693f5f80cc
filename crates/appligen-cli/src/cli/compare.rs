//! `appligen compare`: side-by-side review of the variants of one run.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use appligen_core::variants::compare_variants;
use appligen_types::generation::RunReport;

use super::generate::REPORT_FILE;

pub async fn compare(out: &Path, json: bool) -> Result<()> {
    let path = out.join(REPORT_FILE);
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("no run report at {} (run `appligen generate` first)", path.display()))?;
    let report: RunReport = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let comparisons = compare_variants(&report);

    if json {
        println!("{}", serde_json::to_string_pretty(&comparisons)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Comparing {} output set{} from run {}",
        style("⚖").bold(),
        report.outputs.len(),
        if report.outputs.len() == 1 { "" } else { "s" },
        style(report.run_id).dim()
    );

    for comparison in &comparisons {
        println!();
        println!(
            "  {} {}",
            style(comparison.section.key()).cyan().bold(),
            style(format!(
                "chars {}-{} (avg {}), words {}-{} (avg {})",
                comparison.min_chars,
                comparison.max_chars,
                comparison.avg_chars,
                comparison.min_words,
                comparison.max_words,
                comparison.avg_words
            ))
            .dim()
        );

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Output").fg(Color::White),
            Cell::new("Chars").fg(Color::White),
            Cell::new("Words").fg(Color::White),
            Cell::new("Source").fg(Color::White),
            Cell::new("Preview").fg(Color::White),
        ]);

        for variant in &comparison.variants {
            let source = if variant.failed {
                Cell::new("failed").fg(Color::Red)
            } else if let Some(producer) = &variant.produced_by {
                Cell::new(format!("cache ({producer})")).fg(Color::Yellow)
            } else if variant.from_cache {
                Cell::new("cache").fg(Color::DarkGrey)
            } else {
                Cell::new("fresh").fg(Color::Green)
            };
            table.add_row(vec![
                Cell::new(&variant.output_set).fg(Color::Cyan),
                Cell::new(variant.char_count).fg(Color::White),
                Cell::new(variant.word_count).fg(Color::White),
                source,
                Cell::new(&variant.preview).fg(Color::DarkGrey),
            ]);
        }
        println!("{table}");
    }
    println!();

    Ok(())
}
