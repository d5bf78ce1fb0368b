//! System security status: the persisted record and its read-time projection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall security state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatLevel {
    /// No attack recorded since the last reset.
    #[default]
    Safe,
    /// At least one attack recorded since the last reset.
    UnderAttack,
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::UnderAttack => write!(f, "UNDER_ATTACK"),
        }
    }
}

/// The persisted status record.
///
/// `state` is `UnderAttack` exactly when `total_attacks > 0`; both only move
/// through [`StatusRecord::record_attack`] and [`StatusRecord::fresh`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Security state.
    #[serde(rename = "status")]
    pub state: ThreatLevel,
    /// Time of the most recent attack.
    #[serde(rename = "last_attack")]
    pub last_attack_at: Option<DateTime<Utc>>,
    /// Attacks recorded since the last reset.
    pub total_attacks: u64,
    /// Whether the supervisor currently holds a live watch.
    pub monitoring_active: bool,
    /// Uptime baseline.
    #[serde(rename = "start_time")]
    pub started_at: DateTime<Utc>,
}

impl StatusRecord {
    /// A `SAFE`, zeroed record whose uptime baseline is `now`.
    #[must_use]
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            state: ThreatLevel::Safe,
            last_attack_at: None,
            total_attacks: 0,
            monitoring_active: false,
            started_at: now,
        }
    }

    /// Fold one attack into the record.
    pub fn record_attack(&mut self, at: DateTime<Utc>) {
        self.state = ThreatLevel::UnderAttack;
        self.last_attack_at = Some(at);
        self.total_attacks = self.total_attacks.saturating_add(1);
    }

    /// Project the record at `now`, computing uptime on the fly.
    #[must_use]
    pub fn project(&self, now: DateTime<Utc>) -> SystemStatus {
        let uptime_seconds = u64::try_from(now.signed_duration_since(self.started_at).num_seconds())
            .unwrap_or(0);
        SystemStatus {
            record: self.clone(),
            uptime_seconds,
        }
    }
}

/// Status as reported to readers: the record plus computed uptime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Persisted fields.
    #[serde(flatten)]
    pub record: StatusRecord,
    /// Seconds since `started_at`. Never persisted.
    pub uptime_seconds: u64,
}

impl SystemStatus {
    /// A fresh `SAFE` status with zero uptime.
    #[must_use]
    pub fn fresh(now: DateTime<Utc>) -> Self {
        StatusRecord::fresh(now).project(now)
    }

    /// Security state.
    #[must_use]
    pub fn state(&self) -> ThreatLevel {
        self.record.state
    }

    /// Attacks recorded since the last reset.
    #[must_use]
    pub fn total_attacks(&self) -> u64 {
        self.record.total_attacks
    }

    /// Whether the supervisor currently holds a live watch.
    #[must_use]
    pub fn monitoring_active(&self) -> bool {
        self.record.monitoring_active
    }
}
