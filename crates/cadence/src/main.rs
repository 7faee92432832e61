// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cadence - two-pass LLM outreach sequence generation.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commands;
mod render;
mod shutdown;

use std::io::IsTerminal;
use std::path::PathBuf;

use cadence_config::CadenceConfig;
use cadence_core::{CadenceError, SequenceStatus};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::commands::{GenerateArgs, ToneArgs};

/// Cadence - personalized outreach sequences from a prospect and a tone.
#[derive(Parser, Debug)]
#[command(name = "cadence", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an outreach sequence for a prospect.
    Generate(GenerateArgs),
    /// Show a stored sequence with its messages.
    Show {
        id: String,
        /// Include the model-call attempt log.
        #[arg(long)]
        attempts: bool,
        #[arg(long)]
        json: bool,
    },
    /// List stored sequences.
    List {
        /// Only sequences in this state (pending, generating, completed, failed).
        #[arg(long)]
        status: Option<SequenceStatus>,
        #[arg(long)]
        json: bool,
    },
    /// Preview and manage tone configurations.
    Tone {
        #[command(subcommand)]
        action: ToneCommand,
    },
    /// Token and cost totals for one day.
    Usage {
        /// UTC day as YYYY-MM-DD (defaults to today).
        #[arg(long)]
        date: Option<String>,
    },
    /// Manage Cadence configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ToneCommand {
    /// Print the style instructions for a set of axes.
    Preview(ToneArgs),
    /// Save a named tone configuration.
    Save {
        name: String,
        #[command(flatten)]
        tone: ToneArgs,
    },
    /// List saved tone configurations.
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate configuration and print the effective settings.
    Check,
    /// Print the effective configuration as TOML (API key masked).
    Show,
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cadence={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> CadenceConfig {
    let loaded = match path {
        Some(path) => cadence_config::load_and_validate_path(path),
        None => cadence_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            cadence_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands, config: CadenceConfig) -> Result<(), CadenceError> {
    match command {
        Commands::Generate(args) => commands::run_generate(config, args).await,
        Commands::Show { id, attempts, json } => {
            commands::run_show(config, &id, attempts, json).await
        }
        Commands::List { status, json } => commands::run_list(config, status, json).await,
        Commands::Tone { action } => match action {
            ToneCommand::Preview(tone) => commands::run_tone_preview(&tone),
            ToneCommand::Save { name, tone } => commands::run_tone_save(config, &name, &tone).await,
            ToneCommand::List { json } => commands::run_tone_list(config, json).await,
        },
        Commands::Usage { date } => commands::run_usage(config, date).await,
        Commands::Config { action } => match action {
            ConfigCommand::Check => {
                commands::run_config_check(&config);
                Ok(())
            }
            ConfigCommand::Show => commands::run_config_show(&config),
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.plain || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let config = load_config(cli.config.as_ref());
    init_tracing(&config.agent.log_level);

    let Some(command) = cli.command else {
        println!("cadence: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}
