//! Bridge from `honeytrap_config::Config` to telemetry types.

use honeytrap_config::{Config, LoggingSection};
use honeytrap_telemetry::{LogConfig, LogFormat, LogTarget};

/// Build a [`LogConfig`] from the `[logging]` section.
///
/// Values that fail to parse fall back to the telemetry defaults; the
/// section is validated when the config is loaded. A configured directory
/// switches output to rolling files there.
pub(crate) fn to_log_config(section: &LoggingSection) -> LogConfig {
    let format = section.format.parse().unwrap_or(LogFormat::Compact);
    let target = section
        .directory
        .clone()
        .map_or(LogTarget::Stderr, LogTarget::File);
    section.directives.iter().fold(
        LogConfig::new(section.level.clone())
            .with_format(format)
            .with_target(target),
        |lc, d| lc.with_directive(d.clone()),
    )
}

/// Set up logging from config, with a `--verbose` override.
///
/// Falls back to compact `info` output when the config failed to load.
pub(crate) fn init_logging(config: Option<&Config>, verbose: bool) {
    let mut log_config = match config {
        Some(cfg) => to_log_config(&cfg.logging),
        None => LogConfig::new("info").with_format(LogFormat::Compact),
    };
    if verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = honeytrap_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_maps_to_log_config() {
        let section = LoggingSection {
            level: "warn".to_owned(),
            format: "json".to_owned(),
            directives: vec!["honeytrap_monitor=debug".to_owned()],
            directory: None,
        };
        let lc = to_log_config(&section);
        assert_eq!(lc.level, "warn");
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.directives, ["honeytrap_monitor=debug"]);
        assert_eq!(lc.target, LogTarget::Stderr);
    }

    #[test]
    fn test_directory_selects_file_target() {
        let section = LoggingSection {
            directory: Some("/var/log/honeytrap".into()),
            ..LoggingSection::default()
        };
        let lc = to_log_config(&section);
        assert_eq!(lc.target, LogTarget::File("/var/log/honeytrap".into()));
        assert_eq!(lc.level, "info");
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let section = LoggingSection {
            level: "info".to_owned(),
            format: "xml".to_owned(),
            ..LoggingSection::default()
        };
        assert_eq!(to_log_config(&section).format, LogFormat::Compact);
    }
}
