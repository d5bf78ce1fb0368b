#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for the honeytrap decoy-file monitor.
//!
//! This crate provides a single [`Config`] type covering decoy placement,
//! audit persistence, supervisor timing and logging.
//!
//! # Usage
//!
//! ```rust,no_run
//! use honeytrap_config::Config;
//!
//! // Load with full precedence chain (defaults → system → user → explicit).
//! let resolved = Config::load(None).unwrap();
//! let config = resolved.config;
//! println!("Watching decoys in {}", config.tokens.directory.display());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit** (`--config <file>`)
//! 2. **User** (`~/.honeytrap/config.toml`)
//! 3. **System** (`/etc/honeytrap/config.toml`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! This crate has no dependencies on other internal honeytrap crates.
//! Conversion from config types to domain types happens at the integration
//! boundary (CLI startup, application context construction).

/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// See [`loader::load`] for the full algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(None, explicit)
    }

    /// Load configuration with an explicit home directory override.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load_with_home(
        home_dir: &std::path::Path,
        explicit: Option<&std::path::Path>,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(Some(home_dir), explicit)
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::ValidationError`] if serialization fails.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError {
            field: "<root>".to_owned(),
            message: format!("failed to serialize config: {e}"),
        })
    }

    /// Render the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::ValidationError`] if serialization fails.
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::ValidationError {
            field: "<root>".to_owned(),
            message: format!("failed to serialize config: {e}"),
        })
    }
}
