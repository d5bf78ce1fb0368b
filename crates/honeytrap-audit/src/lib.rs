//! Honeytrap Audit - durable record of honey-token accesses.
//!
//! This crate provides:
//! - [`AttackEvent`]s with strictly increasing identifiers that survive
//!   restarts
//! - A [`SystemStatus`] projection (`SAFE` / `UNDER_ATTACK`) with uptime
//!   computed on every read
//! - Aggregate [`Stats`] over the recorded events
//! - Pluggable [`EventStore`] backends (atomic JSON files, memory)
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use honeytrap_audit::{AttackKind, AuditTrail, ThreatLevel};
//!
//! let trail = AuditTrail::in_memory().unwrap();
//! let event = trail
//!     .record_event(AttackKind::Accessed, Path::new("/tok/passwords.txt"), None, None)
//!     .unwrap();
//!
//! let status = trail.get_status();
//! assert_eq!(status.state(), ThreatLevel::UnderAttack);
//! assert_eq!(trail.get_recent(Some(1))[0].id, event.id);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod actor;
mod error;
mod event;
mod stats;
mod status;
mod storage;
mod trail;

pub use actor::{ActorResolver, NoActorResolver, ProcessActorResolver};
pub use error::{AuditError, AuditResult};
pub use event::{Actor, AttackEvent, AttackId, AttackKind, LOOPBACK, UNKNOWN};
pub use stats::Stats;
pub use status::{StatusRecord, SystemStatus, ThreatLevel};
pub use storage::{
    EVENTS_FILE, EventStore, JsonFileStore, LOCK_FILE, MemoryEventStore, STATUS_FILE, StoreLock,
};
pub use trail::{
    AuditTrail, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT, clamp_recent_limit, parse_recent_limit,
};
