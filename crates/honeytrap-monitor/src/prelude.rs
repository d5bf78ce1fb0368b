//! Prelude module - commonly used types for convenient import.
//!
//! Use `use honeytrap_monitor::prelude::*;` to import all essential types.

// Errors
pub use crate::{ContextError, ContextResult, ErrorClass, SupervisorError, SupervisorResult};

// Supervision
pub use crate::{HealthState, Supervisor, SupervisorConfig, SupervisorState, SupervisorStatus};

// Application
pub use crate::{AppContext, SimulationReport, SystemReport};
