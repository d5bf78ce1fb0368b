//! CLI command implementations.

pub(crate) mod config;
pub(crate) mod events;
pub(crate) mod run;
pub(crate) mod simulate;
pub(crate) mod status;
pub(crate) mod tokens;

use serde::Serialize;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Coloured, human-oriented text.
    Pretty,
    /// Pretty-printed JSON on stdout.
    Json,
}

impl OutputFormat {
    pub(crate) fn parse(raw: &str) -> Self {
        match raw {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Print `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
