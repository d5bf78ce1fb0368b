//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that cross-field invariants hold.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_paths(config)?;
    validate_audit(config)?;
    validate_monitor(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_paths(config: &Config) -> ConfigResult<()> {
    if config.tokens.directory.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "tokens.directory".to_owned(),
            message: "token directory must not be empty".to_owned(),
        });
    }
    if config.audit.directory.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "audit.directory".to_owned(),
            message: "audit directory must not be empty".to_owned(),
        });
    }
    if config
        .logging
        .directory
        .as_ref()
        .is_some_and(|d| d.as_os_str().is_empty())
    {
        return Err(ConfigError::ValidationError {
            field: "logging.directory".to_owned(),
            message: "log directory must not be empty when set".to_owned(),
        });
    }
    Ok(())
}

fn validate_audit(config: &Config) -> ConfigResult<()> {
    let valid_backends = ["json", "memory"];
    if !valid_backends.contains(&config.audit.backend.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "audit.backend".to_owned(),
            message: format!(
                "unsupported audit backend '{}'; expected one of: {}",
                config.audit.backend,
                valid_backends.join(", ")
            ),
        });
    }
    Ok(())
}

fn validate_monitor(config: &Config) -> ConfigResult<()> {
    let m = &config.monitor;

    if m.health_interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "monitor.health_interval_secs".to_owned(),
            message: "health interval must be at least 1 second".to_owned(),
        });
    }

    if m.max_restarts == 0 {
        return Err(ConfigError::ValidationError {
            field: "monitor.max_restarts".to_owned(),
            message: "restart budget must allow at least one restart".to_owned(),
        });
    }

    if m.restart_base_delay_ms > m.restart_max_delay_ms {
        return Err(ConfigError::ValidationError {
            field: "monitor.restart_base_delay_ms".to_owned(),
            message: format!(
                "base delay {}ms exceeds max delay {}ms",
                m.restart_base_delay_ms, m.restart_max_delay_ms
            ),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    Ok(())
}
