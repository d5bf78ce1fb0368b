//! Honeytrap CLI - decoy file monitor.
//!
//! Runs the supervised watch in the foreground and inspects the audit trail
//! and decoys it leaves behind.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use honeytrap_config::{Config, ConfigResult, ResolvedConfig};
use honeytrap_monitor::AppContext;

mod commands;
mod config_bridge;
mod signal;
mod theme;

use commands::{OutputFormat, config, events, run, simulate, status, tokens};

/// Honeytrap - decoy file monitor
#[derive(Parser)]
#[command(name = "honeytrap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (merged over system and user config)
    #[arg(short, long, global = true, env = "HONEYTRAP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the honey tokens in the foreground until Ctrl+C
    Run,

    /// Show security status and monitor health
    Status,

    /// List recorded attacks
    Events {
        /// Number of most recent attacks to show (1-100, default 10)
        #[arg(short, long, conflicts_with = "all")]
        limit: Option<String>,

        /// Show every recorded attack
        #[arg(long)]
        all: bool,
    },

    /// Show attack statistics
    Stats,

    /// Clear recorded attacks and return to SAFE
    Reset,

    /// Attack a honey token to test detection
    Simulate {
        /// Attack kind (accessed, modified, deleted, moved_from, moved_to, moved)
        #[arg(short, long, default_value = "accessed")]
        kind: String,

        /// Honey token file name (defaults to the first token)
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Manage the honey token files
    Tokens {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// View and validate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// List honey tokens with size and modification time
    List,
    /// Write every honey token, overwriting existing files
    Create,
    /// Check the honey tokens and recreate missing ones
    Verify,
    /// Delete every honey token
    Cleanup,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Validate the current configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(cli.config.as_deref());
    config_bridge::init_logging(loaded.as_ref().ok().map(|r| &r.config), cli.verbose);

    let output_format = OutputFormat::parse(&cli.format);

    match cli.command {
        Commands::Run => run::run_monitor(&context(loaded)?).await,
        Commands::Status => status::show_status(&context(loaded)?, output_format),
        Commands::Events { limit, all } => {
            events::list_events(&context(loaded)?, limit.as_deref(), all, output_format)
        },
        Commands::Stats => status::show_stats(&context(loaded)?, output_format),
        Commands::Reset => events::reset(&context(loaded)?, output_format),
        Commands::Simulate { kind, target } => {
            let ctx = context(loaded)?;
            simulate::simulate(&ctx, &kind, target.as_deref(), output_format).await
        },
        Commands::Tokens { command } => handle_tokens(command, &loaded?.config, output_format),
        Commands::Config { command } => handle_config(command, &loaded),
    }
}

/// Build the application context. Decoys are created if missing.
fn context(loaded: ConfigResult<ResolvedConfig>) -> Result<AppContext> {
    Ok(AppContext::initialize(loaded?.config)?)
}

fn handle_tokens(command: TokenCommands, config: &Config, format: OutputFormat) -> Result<()> {
    let decoys = tokens::open_decoys(config)?;
    match command {
        TokenCommands::List => tokens::list_tokens(&decoys, format),
        TokenCommands::Create => tokens::create_tokens(&decoys, format),
        TokenCommands::Verify => tokens::verify_tokens(&decoys, format),
        TokenCommands::Cleanup => tokens::cleanup_tokens(&decoys, format),
    }
}

fn handle_config(command: ConfigCommands, loaded: &ConfigResult<ResolvedConfig>) -> Result<()> {
    match command {
        ConfigCommands::Show { format } => match loaded {
            Ok(resolved) => config::show_config(resolved, &format),
            Err(e) => anyhow::bail!("failed to load configuration: {e}"),
        },
        ConfigCommands::Validate => config::validate_config(loaded),
    }
}
