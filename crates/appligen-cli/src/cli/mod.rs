//! CLI command definitions for the `appligen` binary.
//!
//! Uses clap derive macros for argument parsing. Global flags (`--json`,
//! `--quiet`, `-v`, `--config`) apply to every subcommand.

pub mod cache;
pub mod compare;
pub mod generate;
pub mod provider;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Generate German job application content with local and hosted models.
#[derive(Parser)]
#[command(name = "appligen", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Config file (default: ./appligen.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate application content for a job posting.
    #[command(alias = "gen")]
    Generate(generate::GenerateArgs),

    /// Inspect or clear the content cache.
    Cache {
        #[command(subcommand)]
        action: cache::CacheCommand,
    },

    /// Inspect configured generation backends.
    Provider {
        #[command(subcommand)]
        action: provider::ProviderCommand,
    },

    /// Compare the variants of a previous multi-provider run side by side.
    Compare {
        /// Output directory of the run to compare.
        #[arg(long, default_value = "output")]
        out: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
