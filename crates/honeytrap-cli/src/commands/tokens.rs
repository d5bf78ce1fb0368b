//! Tokens command - manage the decoy files.

use colored::Colorize;
use honeytrap_config::Config;
use honeytrap_tokens::{DecoyDirectory, TokenStore};

use super::{OutputFormat, print_json};
use crate::theme::Theme;

/// The decoy directory named by the config. Nothing is written.
pub(crate) fn open_decoys(config: &Config) -> anyhow::Result<DecoyDirectory> {
    Ok(DecoyDirectory::new(&config.tokens.directory)?)
}

/// List the decoys with size and modification time.
pub(crate) fn list_tokens(decoys: &DecoyDirectory, format: OutputFormat) -> anyhow::Result<()> {
    let infos = decoys.describe();
    if format == OutputFormat::Json {
        return print_json(&infos);
    }

    println!("\n{}", Theme::header("Honey Tokens"));
    println!(
        "{:<22} {:>8}  {}",
        "FILE".dimmed(),
        "SIZE".dimmed(),
        "MODIFIED".dimmed()
    );
    println!("{}", Theme::separator());
    for info in &infos {
        let modified = info
            .modified
            .as_ref()
            .map_or_else(|| "missing".red().to_string(), Theme::timestamp);
        println!("{:<22} {:>8}  {modified}", info.filename, info.size);
    }
    println!(
        "\n{}",
        Theme::dimmed(&format!("{}", decoys.watch_root().display()))
    );
    Ok(())
}

/// Write every decoy, overwriting existing content.
pub(crate) fn create_tokens(decoys: &DecoyDirectory, format: OutputFormat) -> anyhow::Result<()> {
    let written = decoys.create_all()?;
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "created": written }));
    }
    println!(
        "{}",
        Theme::success(&format!(
            "Created {written} honey tokens in {}",
            decoys.watch_root().display()
        ))
    );
    Ok(())
}

/// Report which decoys exist, recreating the missing ones.
pub(crate) fn verify_tokens(decoys: &DecoyDirectory, format: OutputFormat) -> anyhow::Result<()> {
    let present_before = decoys.describe().len();
    let report = decoys.verify_and_recreate_missing()?;
    if format == OutputFormat::Json {
        return print_json(&report);
    }

    let present = report.values().filter(|ok| **ok).count();
    for (name, ok) in &report {
        if *ok {
            println!("{}", Theme::success(name));
        } else {
            println!("{}", Theme::error(&format!("{name} is missing and could not be recreated")));
        }
    }

    let recreated = present.saturating_sub(present_before);
    if recreated > 0 {
        println!(
            "{}",
            Theme::warning(&format!("Recreated {recreated} missing honey tokens"))
        );
    }
    if present == report.len() {
        println!("{}", Theme::success("All honey tokens present"));
        Ok(())
    } else {
        anyhow::bail!("{} honey tokens are missing", report.len().saturating_sub(present))
    }
}

/// Remove every decoy.
pub(crate) fn cleanup_tokens(decoys: &DecoyDirectory, format: OutputFormat) -> anyhow::Result<()> {
    let removed = decoys.cleanup()?;
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "removed": removed }));
    }
    println!("{}", Theme::success(&format!("Removed {removed} honey tokens")));
    Ok(())
}
