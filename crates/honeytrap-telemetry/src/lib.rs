//! Honeytrap Telemetry - Logging for the honeytrap decoy-file monitor.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats
//! - Stdout, stderr or daily-rolling file targets
//! - Integration with the tracing ecosystem
//!
//! # Example
//!
//! ```rust,no_run
//! use honeytrap_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), honeytrap_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("honeytrap_monitor=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("Monitoring decoys");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
