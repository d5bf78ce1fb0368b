//! Simulate command - attack a decoy to exercise detection end to end.

use anyhow::Context;
use colored::Colorize;
use honeytrap_audit::AttackKind;
use honeytrap_monitor::AppContext;

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// Parse a `--kind` value such as `accessed` or `moved_from`.
pub(crate) fn parse_kind(raw: &str) -> anyhow::Result<AttackKind> {
    raw.parse().with_context(|| {
        let known: Vec<&str> = AttackKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

/// Perform a simulated attack and report what was recorded.
pub(crate) async fn simulate(
    ctx: &AppContext,
    kind: &str,
    target: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let kind = parse_kind(kind)?;
    let report = ctx.simulate(kind, target).await?;
    if format == OutputFormat::Json {
        return print_json(&report);
    }

    println!("\n{}", Theme::header("Simulated Attack"));
    println!("{}", Theme::separator());
    println!("{}", Theme::kv("Kind", &report.kind.to_string()));
    println!("{}", Theme::kv("Target", &report.target.display().to_string()));
    if let Some(preview) = &report.content_preview {
        println!("{}", Theme::kv("Content", &preview.dimmed().to_string()));
    }
    match &report.event {
        Some(event) => println!(
            "{}",
            Theme::success(&format!(
                "Recorded {} ({})",
                event.id,
                if report.detected_by_watch {
                    "detected by watch"
                } else {
                    "recorded directly"
                }
            ))
        ),
        None => println!("{}", Theme::warning("The watch did not record the attack")),
    }
    println!(
        "{}",
        Theme::kv(
            "Status",
            &format!(
                "{} -> {}",
                Theme::threat_level(report.status_before.state()),
                Theme::threat_level(report.status_after.state())
            )
        )
    );
    println!();
    Ok(())
}
