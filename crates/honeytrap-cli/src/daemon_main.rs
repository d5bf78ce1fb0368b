//! `honeytrapd` - standalone daemon binary for the honeytrap monitor.
//!
//! This is a thin entry point that runs supervision with auto-restart
//! directly. It exists so that `ps` and process managers show a distinct
//! `honeytrapd` process name.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use honeytrap_config::Config;
use honeytrap_monitor::AppContext;
use honeytrap_tokens::TokenStore;
use tracing::info;

mod config_bridge;
mod signal;

/// Honeytrap daemon - supervised decoy file monitor.
#[derive(Parser)]
#[command(name = "honeytrapd")]
#[command(author, version, about = "Honeytrap daemon - supervised decoy file monitor")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "HONEYTRAP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?.config;
    config_bridge::init_logging(Some(&config), args.verbose);
    config.monitor.auto_restart = true;

    let ctx = AppContext::initialize(config)?;
    println!(
        "{}",
        format!(
            "honeytrapd watching {} ({} tokens)",
            ctx.decoys().watch_root().display(),
            ctx.decoys().token_count()
        )
        .cyan()
        .bold()
    );
    info!("daemon starting");

    ctx.run_until(signal::wait_for_ctrl_c()).await?;

    println!("{}", "Daemon stopped".green().bold());
    Ok(())
}
