//! Prelude module - commonly used types for convenient import.
//!
//! Use `use honeytrap_audit::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuditError, AuditResult};

// Trail
pub use crate::{AuditTrail, EventStore, JsonFileStore, MemoryEventStore};

// Records
pub use crate::{Actor, AttackEvent, AttackId, AttackKind, Stats, SystemStatus, ThreatLevel};
