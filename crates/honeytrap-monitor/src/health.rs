//! Health check results for the supervisor.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reported health of the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Not monitoring.
    Stopped,
    /// Watch alive and every check passing.
    Healthy,
    /// The last check recorded an error.
    Degraded,
    /// Repeated failures or a dead watch.
    Unhealthy,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Result of one sub-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// What was checked (`watch`, `tokens`, `watch_root`, `audit`).
    pub component: String,

    /// Whether the check passed.
    pub passed: bool,

    /// Failure description.
    pub message: Option<String>,

    /// Check duration.
    pub duration_ms: u64,
}

impl HealthCheck {
    /// A passing check.
    #[must_use]
    pub fn passed(component: impl Into<String>, duration: Duration) -> Self {
        Self {
            component: component.into(),
            passed: true,
            message: None,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// A failing check.
    #[must_use]
    pub fn failed(
        component: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            component: component.into(),
            passed: false,
            message: Some(message.into()),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Outcome of a full health check pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// When the pass ran.
    pub checked_at: DateTime<Utc>,

    /// Individual results, in execution order.
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Bundle check results.
    #[must_use]
    pub fn from_checks(checks: Vec<HealthCheck>) -> Self {
        Self {
            checked_at: Utc::now(),
            checks,
        }
    }

    /// Whether every check passed.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// The failing checks.
    #[must_use]
    pub fn failures(&self) -> Vec<&HealthCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Failure messages joined into one line, `None` when healthy.
    #[must_use]
    pub fn error_summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .failures()
            .into_iter()
            .map(|c| match &c.message {
                Some(msg) => format!("{}: {msg}", c.component),
                None => c.component.clone(),
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Derive the reported health from supervisor counters.
///
/// Precedence: stopped, then unhealthy (more than three consecutive failed
/// checks, or the watch is not actually alive), then degraded (an error is
/// recorded), then healthy.
#[must_use]
pub fn derive_health(
    monitoring: bool,
    last_error: Option<&str>,
    error_count: u32,
    watch_alive: bool,
) -> HealthState {
    if !monitoring {
        HealthState::Stopped
    } else if error_count > 3 || !watch_alive {
        HealthState::Unhealthy
    } else if last_error.is_some() {
        HealthState::Degraded
    } else {
        HealthState::Healthy
    }
}
