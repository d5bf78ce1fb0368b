//! Configuration struct definitions.
//!
//! Every section derives `Deserialize` with `#[serde(default)]` so partial
//! files only need to mention the keys they override.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level honeytrap configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decoy file placement.
    pub tokens: TokensSection,
    /// Audit trail persistence.
    pub audit: AuditSection,
    /// Supervisor timing and restart policy.
    pub monitor: MonitorSection,
    /// Logging and tracing.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// TokensSection
// ---------------------------------------------------------------------------

/// Where the honey-token files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensSection {
    /// Directory holding the decoy files. Relative paths resolve against the
    /// process working directory.
    pub directory: PathBuf,
}

impl Default for TokensSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("honey_tokens"),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditSection
// ---------------------------------------------------------------------------

/// Audit trail storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Directory holding `attacks.json` and `system_status.json`.
    pub directory: PathBuf,
    /// Storage backend: `"json"` (durable files) or `"memory"` (volatile).
    pub backend: String,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            backend: "json".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// MonitorSection
// ---------------------------------------------------------------------------

/// Supervisor timing, restart budget and health-check cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Seconds between auto-restart loop iterations.
    pub health_interval_secs: u64,
    /// Restarts allowed before the budget is exhausted.
    pub max_restarts: u32,
    /// First restart delay in milliseconds.
    pub restart_base_delay_ms: u64,
    /// Upper bound for the restart delay in milliseconds.
    pub restart_max_delay_ms: u64,
    /// Seconds of continuous healthy running after which the restart budget
    /// is refilled.
    pub stability_secs: u64,
    /// Milliseconds to wait after attaching the watch before confirming it
    /// is alive.
    pub start_grace_ms: u64,
    /// Milliseconds to wait for the watch task to exit on stop before it is
    /// aborted.
    pub stop_timeout_ms: u64,
    /// Internal loop failures tolerated before the auto-restart loop disables
    /// itself.
    pub max_loop_errors: u32,
    /// Whether `run` starts the auto-restart loop.
    pub auto_restart: bool,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            health_interval_secs: 30,
            max_restarts: 5,
            restart_base_delay_ms: 1_000,
            restart_max_delay_ms: 60_000,
            stability_secs: 300,
            start_grace_ms: 500,
            stop_timeout_ms: 5_000,
            max_loop_errors: 10,
            auto_restart: true,
        }
    }
}

impl MonitorSection {
    /// Health-check interval as a [`Duration`].
    #[must_use]
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    /// Initial restart delay as a [`Duration`].
    #[must_use]
    pub fn restart_base_delay(&self) -> Duration {
        Duration::from_millis(self.restart_base_delay_ms)
    }

    /// Restart delay cap as a [`Duration`].
    #[must_use]
    pub fn restart_max_delay(&self) -> Duration {
        Duration::from_millis(self.restart_max_delay_ms)
    }

    /// Stability threshold as a [`Duration`].
    #[must_use]
    pub fn stability_threshold(&self) -> Duration {
        Duration::from_secs(self.stability_secs)
    }

    /// Start grace period as a [`Duration`].
    #[must_use]
    pub fn start_grace(&self) -> Duration {
        Duration::from_millis(self.start_grace_ms)
    }

    /// Stop timeout as a [`Duration`].
    #[must_use]
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"` (human-friendly), `"compact"` (one-line),
    /// `"json"` (structured), or `"full"` (verbose).
    pub format: String,
    /// Per-crate tracing directives (e.g. `["honeytrap_monitor=debug",
    /// "notify=warn"]`).
    pub directives: Vec<String>,
    /// Write daily-rolling log files here instead of to stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            directory: None,
        }
    }
}
