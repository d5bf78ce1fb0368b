//! Honeytrap Monitor - keeps a live watch over the honey-tokens.
//!
//! This crate provides:
//! - [`WatchSet`], the canonicalized protected path set and notification
//!   classifier
//! - [`Supervisor`], which owns the live filesystem watch, runs health
//!   checks and restarts the watch with bounded exponential backoff
//! - [`AppContext`], the decoy store, audit trail and supervisor wired
//!   together from configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use honeytrap_config::Config;
//! use honeytrap_monitor::AppContext;
//!
//! # async fn run() -> Result<(), honeytrap_monitor::ContextError> {
//! let ctx = AppContext::initialize(Config::default())?;
//! // Monitor for one minute.
//! ctx.run_until(tokio::time::sleep(std::time::Duration::from_secs(60)))
//!     .await?;
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

mod backoff;
mod context;
mod error;
mod health;
mod session;
mod supervisor;
mod watchset;

pub use context::{AppContext, SIMULATION_DETECTION_WINDOW, SimulationReport, SystemReport};
pub use error::{ContextError, ContextResult, ErrorClass, SupervisorError, SupervisorResult};
pub use health::{HealthCheck, HealthReport, HealthState, derive_health};
pub use supervisor::{Supervisor, SupervisorConfig, SupervisorState, SupervisorStatus};
pub use watchset::{RawKind, RawNotification, WatchSet};
