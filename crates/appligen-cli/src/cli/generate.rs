//! `appligen generate`: run the coordinator and write one folder per output set.
//!
//! Layout under `--out`:
//!
//! ```text
//! out/
//!   run_report.json            full RunReport (read back by `appligen compare`)
//!   local_llama3-2-3b/content.json   section key -> text, for the renderer
//!   remote_claude-3-5-sonnet-20241022/content.json
//!   static_content/content.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use appligen_core::posting::parse_posting_header;
use appligen_types::config::GeneratorConfig;
use appligen_types::generation::{ApplicationInputs, RunReport};
use appligen_types::section::SectionSet;

use crate::state::AppState;

pub const REPORT_FILE: &str = "run_report.json";
const CONTENT_FILE: &str = "content.json";

/// Arguments for `appligen generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Applicant profile (plain text or Markdown).
    #[arg(long, value_name = "PATH")]
    pub profile: PathBuf,

    /// Job posting (plain text or Markdown).
    #[arg(long, value_name = "PATH")]
    pub job: PathBuf,

    /// Company name (default: read from the posting's `Adressat:` line).
    #[arg(long)]
    pub company: Option<String>,

    /// Position title (default: read from the posting's `Stelle:` line).
    #[arg(long)]
    pub position: Option<String>,

    /// Directory that receives one folder per output set.
    #[arg(long, default_value = "output")]
    pub out: PathBuf,

    /// `auto`, `all`, or a backend name (`local`, `remote`, `static`).
    #[arg(long)]
    pub provider_mode: Option<String>,

    /// Do not fall back to the next backend when one fails.
    #[arg(long)]
    pub no_fallback: bool,

    /// Clear the content cache before generating.
    #[arg(long)]
    pub clear_cache: bool,

    /// Content cache file.
    #[arg(long, value_name = "PATH")]
    pub cache_path: Option<PathBuf>,

    /// Per-call timeout in seconds (at least 1).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Which sections to generate.
    #[arg(long, value_enum)]
    pub sections: Option<SectionsArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SectionsArg {
    /// The five cover letter sections.
    CoverLetter,
    /// Cover letter plus CV enhancement sections.
    Full,
}

impl From<SectionsArg> for SectionSet {
    fn from(value: SectionsArg) -> Self {
        match value {
            SectionsArg::CoverLetter => SectionSet::CoverLetter,
            SectionsArg::Full => SectionSet::Full,
        }
    }
}

impl GenerateArgs {
    /// Command-line flags win over file and environment settings.
    pub fn apply_to(&self, config: &mut GeneratorConfig) {
        if let Some(mode) = &self.provider_mode {
            config.provider_mode = Some(mode.clone());
        }
        if self.no_fallback {
            config.enable_fallback = false;
        }
        if self.clear_cache {
            config.clear_cache_before_run = true;
        }
        if let Some(path) = &self.cache_path {
            config.cache_path = path.clone();
        }
        if let Some(secs) = self.timeout {
            config.call_timeout_secs = secs;
        }
        if let Some(sections) = self.sections {
            config.sections = sections.into();
        }
    }
}

/// Read the input files and fill in company/position.
async fn read_inputs(args: &GenerateArgs) -> Result<ApplicationInputs> {
    let profile_text = tokio::fs::read_to_string(&args.profile)
        .await
        .with_context(|| format!("failed to read profile {}", args.profile.display()))?;
    let job_text = tokio::fs::read_to_string(&args.job)
        .await
        .with_context(|| format!("failed to read job posting {}", args.job.display()))?;

    let mut header = parse_posting_header(&job_text);
    if let Some(company) = &args.company {
        header.company_name = company.clone();
    }
    if let Some(position) = &args.position {
        header.position_title = position.clone();
    }
    if !header.has_company() {
        tracing::warn!("No company name found in posting; pass --company to set one");
    }

    Ok(header.into_inputs(profile_text, job_text))
}

#[derive(Serialize)]
struct ContentFile<'a> {
    backend: &'a str,
    model: &'a str,
    generated_at: String,
    sections: std::collections::BTreeMap<String, String>,
    failed_sections: Vec<&'static str>,
    tokens_used: u64,
}

/// Write `content.json` for every output set plus the full report.
async fn write_outputs(out: &Path, report: &RunReport) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("failed to create {}", out.display()))?;

    let mut written = Vec::with_capacity(report.outputs.len());
    for output in report.outputs.values() {
        let dir = out.join(output.folder_name());
        tokio::fs::create_dir_all(&dir).await?;

        let file = ContentFile {
            backend: &output.backend_name,
            model: &output.model_identifier,
            generated_at: output.generated_at.to_rfc3339(),
            sections: output.text_mapping(),
            failed_sections: output.failed_sections.iter().map(|s| s.key()).collect(),
            tokens_used: output.total_tokens(),
        };
        let path = dir.join(CONTENT_FILE);
        tokio::fs::write(&path, serde_json::to_vec_pretty(&file)?)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    tokio::fs::write(out.join(REPORT_FILE), serde_json::to_vec_pretty(report)?).await?;
    Ok(written)
}

/// Run one generation and print a summary.
pub async fn generate(mut state: AppState, args: GenerateArgs, json: bool) -> Result<()> {
    args.apply_to(&mut state.config);
    let inputs = read_inputs(&args).await?;

    tracing::info!(
        company = %inputs.company_name,
        position = %inputs.position_title,
        mode = %state.config.provider_mode(),
        "Starting generation run"
    );

    let coordinator = state.coordinator();
    let report = coordinator.run(&inputs).await?;
    let written = write_outputs(&args.out, &report).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Generated content for {} at {}",
        style("✓").green().bold(),
        style(&inputs.position_title).cyan(),
        style(&inputs.company_name).cyan()
    );
    println!("  {}", style(format!("Run {}", report.run_id)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Backend").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Sections").fg(Color::White),
        Cell::new("Cached").fg(Color::White),
        Cell::new("Failed").fg(Color::White),
        Cell::new("Tokens").fg(Color::White),
        Cell::new("Folder").fg(Color::White),
    ]);

    for output in report.outputs.values() {
        let failed = output.failed_sections.len();
        let failed_cell = if failed == 0 {
            Cell::new("0").fg(Color::Green)
        } else {
            Cell::new(failed).fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&output.backend_name).fg(Color::Cyan),
            Cell::new(&output.model_identifier).fg(Color::DarkGrey),
            Cell::new(output.sections.len()).fg(Color::White),
            Cell::new(output.cached_count()).fg(Color::White),
            failed_cell,
            Cell::new(output.total_tokens()).fg(Color::White),
            Cell::new(output.folder_name()).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
    println!();

    if !report.skipped.is_empty() {
        println!(
            "  {} Skipped (unavailable): {}",
            style("i").blue().bold(),
            report.skipped.join(", ")
        );
    }
    if let Some(cleared) = report.cache_entries_cleared {
        println!(
            "  {} Cleared {} cache entr{}",
            style("i").blue().bold(),
            cleared,
            if cleared == 1 { "y" } else { "ies" }
        );
    }
    if report.any_partial_failure() {
        println!(
            "  {} Some sections could not be generated and hold placeholders",
            style("!").yellow().bold()
        );
    }
    println!(
        "  {} file{} written to {}",
        style(written.len()).bold(),
        if written.len() == 1 { "" } else { "s" },
        style(args.out.display()).cyan()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appligen_types::generation::RunOutputSet;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn args(dir: &Path) -> GenerateArgs {
        GenerateArgs {
            profile: dir.join("profil.md"),
            job: dir.join("stelle.md"),
            company: None,
            position: None,
            out: dir.join("out"),
            provider_mode: None,
            no_fallback: false,
            clear_cache: false,
            cache_path: None,
            timeout: None,
            sections: None,
        }
    }

    #[test]
    fn flags_override_config() {
        let tmp = TempDir::new().unwrap();
        let mut args = args(tmp.path());
        args.provider_mode = Some("static".to_string());
        args.no_fallback = true;
        args.timeout = Some(42);
        args.sections = Some(SectionsArg::Full);

        let mut config = GeneratorConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.provider_mode.as_deref(), Some("static"));
        assert!(!config.enable_fallback);
        assert_eq!(config.call_timeout_secs, 42);
        assert_eq!(config.sections, SectionSet::Full);
        assert!(!config.clear_cache_before_run);
    }

    #[tokio::test]
    async fn inputs_read_from_posting_header() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("profil.md"), "7 Jahre Kubernetes")
            .await
            .unwrap();
        tokio::fs::write(
            tmp.path().join("stelle.md"),
            "Adressat: Acme GmbH Hauptstraße 1 10115 Berlin\nStelle: DevOps Engineer\n\nWir suchen...",
        )
        .await
        .unwrap();

        let inputs = read_inputs(&args(tmp.path())).await.unwrap();
        assert_eq!(inputs.company_name, "Acme GmbH");
        assert_eq!(inputs.position_title, "DevOps Engineer");
        assert_eq!(inputs.profile_text, "7 Jahre Kubernetes");
    }

    #[tokio::test]
    async fn explicit_company_wins() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("profil.md"), "p").await.unwrap();
        tokio::fs::write(tmp.path().join("stelle.md"), "Stelle: SRE").await.unwrap();

        let mut args = args(tmp.path());
        args.company = Some("Initech".to_string());
        let inputs = read_inputs(&args).await.unwrap();
        assert_eq!(inputs.company_name, "Initech");
        assert_eq!(inputs.position_title, "SRE");
    }

    #[tokio::test]
    async fn missing_profile_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(read_inputs(&args(tmp.path())).await.is_err());
    }

    #[tokio::test]
    async fn outputs_written_per_set() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let mut outputs = BTreeMap::new();
        outputs.insert(
            "local".to_string(),
            RunOutputSet {
                backend_name: "local".to_string(),
                model_identifier: "llama3.2:3b".to_string(),
                sections: BTreeMap::new(),
                failed_sections: Vec::new(),
                generated_at: chrono::Utc::now(),
            },
        );
        let report = RunReport {
            run_id: uuid::Uuid::now_v7(),
            outputs,
            skipped: vec!["remote".to_string()],
            cache_entries_cleared: None,
        };

        let written = write_outputs(&out, &report).await.unwrap();
        assert_eq!(written, vec![out.join("local_llama3-2-3b").join(CONTENT_FILE)]);
        assert!(out.join(REPORT_FILE).exists());

        let content = tokio::fs::read_to_string(&written[0]).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["backend"], "local");
        assert_eq!(parsed["model"], "llama3.2:3b");
    }
}
