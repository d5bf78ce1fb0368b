//! Events command - list recorded attacks, and reset the audit trail.

use colored::Colorize;
use honeytrap_audit::{AttackEvent, parse_recent_limit};
use honeytrap_monitor::AppContext;

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// List the most recent attacks, or all of them with `all`.
///
/// `limit` is the raw `--limit` value; it is clamped the same way a query
/// string would be.
pub(crate) fn list_events(
    ctx: &AppContext,
    limit: Option<&str>,
    all: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let events = if all {
        ctx.audit().get_all()
    } else {
        let limit = i64::try_from(parse_recent_limit(limit)).unwrap_or(i64::MAX);
        ctx.audit().get_recent(Some(limit))
    };

    if format == OutputFormat::Json {
        return print_json(&events);
    }

    if events.is_empty() {
        println!("{}", Theme::info("No attacks recorded"));
        return Ok(());
    }

    println!("\n{}", Theme::header("Recorded Attacks"));
    println!(
        "{:<9} {:<19} {:<11} {:<22} {}",
        "ID".dimmed(),
        "TIME".dimmed(),
        "KIND".dimmed(),
        "FILE".dimmed(),
        "PROCESS".dimmed()
    );
    println!("{}", Theme::separator());
    for event in &events {
        print_event(event);
    }
    println!();
    Ok(())
}

fn print_event(event: &AttackEvent) {
    println!(
        "{:<9} {:<19} {:<11} {:<22} {} ({})",
        event.id.to_string().cyan(),
        Theme::timestamp(&event.occurred_at),
        event.kind.to_string().red(),
        event.target_name,
        event.actor.process_name,
        event.actor.display_pid()
    );
}

/// Clear every recorded attack and return the status to `SAFE`.
pub(crate) fn reset(ctx: &AppContext, format: OutputFormat) -> anyhow::Result<()> {
    let ok = ctx.audit().reset();
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "success": ok }));
    }
    if ok {
        println!("{}", Theme::success("Audit trail reset, status is SAFE"));
        Ok(())
    } else {
        anyhow::bail!("failed to reset the audit trail")
    }
}
