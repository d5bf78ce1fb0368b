//! Config command - show and validate configuration.

use honeytrap_config::{ConfigResult, ResolvedConfig};

use crate::theme::Theme;

/// Print the resolved configuration in TOML or JSON.
pub(crate) fn show_config(resolved: &ResolvedConfig, format: &str) -> anyhow::Result<()> {
    if resolved.loaded_files.is_empty() {
        println!("{}", Theme::dimmed("# built-in defaults only"));
    } else {
        for file in &resolved.loaded_files {
            println!("{}", Theme::dimmed(&format!("# loaded: {file}")));
        }
    }

    let rendered = match format {
        "json" => resolved.config.to_json()?,
        "toml" => resolved.config.to_toml()?,
        other => anyhow::bail!("unknown config format '{other}' (expected toml or json)"),
    };
    println!("{rendered}");
    Ok(())
}

/// Report whether the layered configuration loads and validates.
pub(crate) fn validate_config(loaded: &ConfigResult<ResolvedConfig>) -> anyhow::Result<()> {
    match loaded {
        Ok(resolved) => {
            let sources = if resolved.loaded_files.is_empty() {
                "defaults".to_owned()
            } else {
                resolved.loaded_files.join(", ")
            };
            println!(
                "{}",
                Theme::success(&format!("Configuration is valid ({sources})"))
            );
            Ok(())
        },
        Err(e) => {
            println!("{}", Theme::error(&e.to_string()));
            anyhow::bail!("configuration is invalid")
        },
    }
}
