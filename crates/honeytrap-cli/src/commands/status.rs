//! Status and statistics commands.

use colored::Colorize;
use honeytrap_monitor::AppContext;

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// Show the security status and the supervisor snapshot.
pub(crate) fn show_status(ctx: &AppContext, format: OutputFormat) -> anyhow::Result<()> {
    let report = ctx.system_report();
    if format == OutputFormat::Json {
        return print_json(&report);
    }

    let status = &report.status;
    println!("\n{}", Theme::header("System Status"));
    println!("{}", Theme::separator());
    println!("{}", Theme::kv("State", &Theme::threat_level(status.state())));
    println!(
        "{}",
        Theme::kv("Total attacks", &status.total_attacks().to_string())
    );
    let last = status
        .record
        .last_attack_at
        .as_ref()
        .map_or_else(|| "never".dimmed().to_string(), Theme::timestamp);
    println!("{}", Theme::kv("Last attack", &last));
    println!(
        "{}",
        Theme::kv(
            "Monitoring",
            if status.monitoring_active() {
                "active"
            } else {
                "inactive"
            }
        )
    );
    println!("{}", Theme::kv("Uptime", &Theme::uptime(status.uptime_seconds)));
    println!(
        "{}",
        Theme::kv("Protected files", &ctx.decoys().token_count().to_string())
    );
    println!("{}", Theme::kv("Health", &Theme::health(report.monitor.health_status)));
    if let Some(err) = &report.monitor.last_error {
        println!("{}", Theme::warning(err));
    }
    println!();
    Ok(())
}

/// Show aggregate attack statistics.
pub(crate) fn show_stats(ctx: &AppContext, format: OutputFormat) -> anyhow::Result<()> {
    let stats = ctx.audit().get_statistics();
    if format == OutputFormat::Json {
        return print_json(&stats);
    }

    println!("\n{}", Theme::header("Attack Statistics"));
    println!("{}", Theme::separator());
    println!("{}", Theme::kv("Total attacks", &stats.total_attacks.to_string()));
    println!(
        "{}",
        Theme::kv(
            "Most targeted",
            stats.most_targeted_file.as_deref().unwrap_or("-")
        )
    );
    println!(
        "{}",
        Theme::kv(
            "Most common",
            &stats
                .most_common_event
                .map_or_else(|| "-".to_owned(), |k| k.to_string())
        )
    );

    if !stats.event_types.is_empty() {
        println!("\n{}", "By kind".bold());
        for (kind, count) in &stats.event_types {
            println!("  {:<12} {count:>6}", kind.to_string());
        }
    }
    if !stats.targeted_files.is_empty() {
        println!("\n{}", "By file".bold());
        for (file, count) in &stats.targeted_files {
            println!("  {file:<24} {count:>6}");
        }
    }
    println!();
    Ok(())
}
