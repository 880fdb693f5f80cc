//! Content cache commands: stats, clear.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use appligen_core::cache::ContentCache;

use crate::state::AppState;

/// Cache management subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show entry count, file size and cached tokens.
    Stats,

    /// Remove every cached entry.
    Clear,
}

pub async fn handle_cache_command(cmd: CacheCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        CacheCommand::Stats => cache_stats(state, json).await,
        CacheCommand::Clear => cache_clear(state, json).await,
    }
}

async fn cache_stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.cache().stats().await?;

    if json {
        let value = serde_json::json!({
            "path": state.config.cache_path.display().to_string(),
            "entry_count": stats.entry_count,
            "size_bytes": stats.size_bytes,
            "total_tokens": stats.total_tokens,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("── Content Cache ──").dim());
    println!(
        "  File:    {}",
        style(state.config.cache_path.display()).dim()
    );
    println!("  Entries: {}", style(stats.entry_count).bold());
    println!("  Size:    {}", format_bytes(stats.size_bytes));
    println!("  Tokens:  {}", format_tokens(stats.total_tokens));
    println!();

    Ok(())
}

async fn cache_clear(state: &AppState, json: bool) -> Result<()> {
    let removed = state.cache().clear().await?;
    tracing::info!(removed, "Content cache cleared");

    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!();
        println!(
            "  {} Removed {} cache entr{}",
            style("✓").green().bold(),
            style(removed).bold(),
            if removed == 1 { "y" } else { "ies" }
        );
        println!();
    }
    Ok(())
}

fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn format_bytes(n: u64) -> String {
    if n >= 1024 * 1024 {
        format!("{:.1} MiB", n as f64 / (1024.0 * 1024.0))
    } else if n >= 1024 {
        format!("{:.1} KiB", n as f64 / 1024.0)
    } else {
        format!("{n} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(950), "950");
        assert_eq!(format_tokens(12_300), "12.3K");
        assert_eq!(format_tokens(2_500_000), "2.5M");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
    }
}
