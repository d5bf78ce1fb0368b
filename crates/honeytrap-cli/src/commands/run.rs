//! Run command - supervise the watch in the foreground until Ctrl+C.

use colored::Colorize;
use honeytrap_monitor::AppContext;
use honeytrap_tokens::TokenStore;

use crate::signal::wait_for_ctrl_c;
use crate::theme::{Theme, print_banner};

/// Monitor until Ctrl+C.
pub(crate) async fn run_monitor(ctx: &AppContext) -> anyhow::Result<()> {
    print_banner();
    println!(
        "{}",
        Theme::kv("Tokens", &ctx.decoys().watch_root().display().to_string())
    );
    println!(
        "{}",
        Theme::kv(
            "Auto-restart",
            if ctx.config().monitor.auto_restart {
                "on"
            } else {
                "off"
            }
        )
    );
    println!("{}", Theme::dimmed("Press Ctrl+C to stop"));

    ctx.run_until(wait_for_ctrl_c()).await?;

    println!("\n{}", "Monitoring stopped".green().bold());
    Ok(())
}
