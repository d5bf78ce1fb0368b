//! Attack event types.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AuditError;

/// Placeholder for actor fields that could not be determined.
pub const UNKNOWN: &str = "Unknown";

/// Source address recorded for local accesses.
pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Identifier of a recorded attack.
///
/// Strictly increasing within one trail. Renders as `ATK_001`, `ATK_002`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttackId(u64);

impl AttackId {
    /// The identifier handed out by an empty trail.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw sequence number.
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// The raw sequence number.
    #[must_use]
    pub const fn seq(self) -> u64 {
        self.0
    }

    /// The identifier following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for AttackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ATK_{:03}", self.0)
    }
}

impl FromStr for AttackId {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("ATK_")
            .and_then(|digits| digits.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| AuditError::InvalidId(s.to_owned()))
    }
}

impl Serialize for AttackId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AttackId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How a honey-token was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// File opened or read.
    Accessed,
    /// Contents or metadata changed.
    Modified,
    /// File removed.
    Deleted,
    /// File renamed away from a protected path.
    MovedFrom,
    /// File renamed onto a protected path.
    MovedTo,
    /// Rename where only one endpoint is known.
    Moved,
}

impl AttackKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Accessed,
        Self::Modified,
        Self::Deleted,
        Self::MovedFrom,
        Self::MovedTo,
        Self::Moved,
    ];

    /// The wire name (`"accessed"`, `"moved_from"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accessed => "accessed",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::MovedFrom => "moved_from",
            Self::MovedTo => "moved_to",
            Self::Moved => "moved",
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttackKind {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AuditError::SerializationError(format!("unknown attack kind '{s}'")))
    }
}

/// Best-effort description of the process behind an access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Executable name.
    pub process_name: String,
    /// Process id, `None` when it could not be determined.
    pub process_id: Option<u32>,
    /// Owning user name.
    pub username: String,
    /// Full command line.
    pub command_line: String,
}

impl Actor {
    /// An actor with every field unknown.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            process_name: UNKNOWN.to_owned(),
            process_id: None,
            username: UNKNOWN.to_owned(),
            command_line: UNKNOWN.to_owned(),
        }
    }

    /// The process id, or `"Unknown"`.
    #[must_use]
    pub fn display_pid(&self) -> String {
        self.process_id
            .map_or_else(|| UNKNOWN.to_owned(), |pid| pid.to_string())
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A recorded access to a honey-token. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// Unique, increasing identifier.
    #[serde(rename = "attack_id")]
    pub id: AttackId,
    /// When the trail recorded the event.
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,
    /// What happened to the file.
    #[serde(rename = "event_type")]
    pub kind: AttackKind,
    /// Absolute path of the touched file.
    #[serde(rename = "file_path")]
    pub target_path: PathBuf,
    /// Base name of the touched file.
    #[serde(rename = "filename")]
    pub target_name: String,
    /// Process behind the access.
    #[serde(flatten)]
    pub actor: Actor,
    /// Network origin; loopback for local access.
    #[serde(rename = "ip_address")]
    pub source_address: IpAddr,
}

impl AttackEvent {
    /// Build an event. `target_name` is derived from the path.
    #[must_use]
    pub fn new(
        id: AttackId,
        occurred_at: DateTime<Utc>,
        kind: AttackKind,
        target_path: &Path,
        actor: Actor,
        source_address: IpAddr,
    ) -> Self {
        Self {
            id,
            occurred_at,
            kind,
            target_path: target_path.to_path_buf(),
            target_name: base_name(target_path),
            actor,
            source_address,
        }
    }
}

/// The final component of `path`, or the whole path when it has none.
fn base_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}
