//! Provider commands: probe every configured backend and show the result.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use appligen_core::probe::probe_backends;

use crate::state::AppState;

/// Provider subcommands.
#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Probe all configured backends and show availability.
    Status,
}

pub async fn handle_provider_command(
    cmd: ProviderCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        ProviderCommand::Status => provider_status(state, json).await,
    }
}

/// Probe each backend once, concurrently, and print a table in fallback order.
async fn provider_status(state: &AppState, json: bool) -> Result<()> {
    let registry = state.registry();
    let outcome = probe_backends(registry.backends(), state.config.probe_timeout()).await;
    let reports = outcome.reports();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("Generation Backends").bold());
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Priority").fg(Color::White),
        Cell::new("Backend").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Probe").fg(Color::White),
    ]);

    for report in &reports {
        let priority = if report.priority == u32::MAX {
            "last".to_string()
        } else {
            report.priority.to_string()
        };
        let status_cell = if report.available {
            Cell::new("available").fg(Color::Green)
        } else {
            Cell::new("unavailable").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(priority).fg(Color::Cyan),
            Cell::new(&report.name).fg(Color::White),
            Cell::new(report.kind.to_string()).fg(Color::DarkGrey),
            Cell::new(&report.model).fg(Color::DarkGrey),
            status_cell,
            Cell::new(format!("{} ms", report.latency_ms)).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!();
    let available = reports.iter().filter(|r| r.available).count();
    println!(
        "  {} of {} backend{} available",
        style(available).bold(),
        reports.len(),
        if reports.len() == 1 { "" } else { "s" }
    );
    println!(
        "  {}",
        style(format!(
            "Mode: {} (config: {})",
            state.config.provider_mode(),
            state.config_path.display()
        ))
        .dim()
    );
    println!();

    Ok(())
}
