//! Application context: the decoy store, audit trail and supervisor built
//! once from configuration and shared by every command.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use honeytrap_audit::{AttackEvent, AttackKind, AuditTrail, Stats, SystemStatus};
use honeytrap_config::Config;
use honeytrap_tokens::{DecoyDirectory, TokenStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ContextError, ContextResult};
use crate::supervisor::{Supervisor, SupervisorConfig, SupervisorStatus};

/// How long a simulation waits for the live watch to record the attack.
pub const SIMULATION_DETECTION_WINDOW: Duration = Duration::from_millis(1500);

const SIMULATION_POLL: Duration = Duration::from_millis(50);

/// Line appended to a decoy by a simulated modification.
const SIMULATED_MODIFICATION: &str = "\n# Simulated modification by attacker";

/// Outcome of [`AppContext::simulate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// The simulated attack.
    pub kind: AttackKind,
    /// The decoy that was touched.
    pub target: PathBuf,
    /// First bytes read from the decoy, for `accessed`.
    pub content_preview: Option<String>,
    /// The resulting event, if one was recorded.
    pub event: Option<AttackEvent>,
    /// Whether the live watch recorded the event, as opposed to the
    /// simulation recording it itself.
    pub detected_by_watch: bool,
    /// System status before the attack.
    pub status_before: SystemStatus,
    /// System status after the attack.
    pub status_after: SystemStatus,
}

/// Combined view for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemReport {
    /// Audit status with uptime.
    pub status: SystemStatus,
    /// Aggregates over every event.
    pub statistics: Stats,
    /// Supervisor snapshot.
    pub monitor: SupervisorStatus,
}

/// Everything a command needs, built once at startup.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Arc<Config>,
    decoys: Arc<DecoyDirectory>,
    audit: Arc<AuditTrail>,
    supervisor: Arc<Supervisor>,
}

impl AppContext {
    /// Build the context from configuration.
    ///
    /// Missing decoys are written (existing ones are left untouched) and the
    /// audit trail is opened with the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoy directory or the audit trail cannot be
    /// set up.
    pub fn initialize(config: Config) -> ContextResult<Self> {
        let decoys = DecoyDirectory::new(&config.tokens.directory)?;
        let written = decoys.create_missing()?;
        if written > 0 {
            info!(count = written, dir = %decoys.watch_root().display(), "created honey-tokens");
        }

        let audit = match config.audit.backend.as_str() {
            "memory" => AuditTrail::in_memory()?,
            _ => AuditTrail::open(&config.audit.directory)?,
        };

        let decoys = Arc::new(decoys);
        let audit = Arc::new(audit);
        let supervisor = Arc::new(Supervisor::new(
            SupervisorConfig::from(&config.monitor),
            Arc::clone(&decoys) as Arc<dyn TokenStore>,
            Arc::clone(&audit),
        ));

        Ok(Self {
            config: Arc::new(config),
            decoys,
            audit,
            supervisor,
        })
    }

    /// The configuration the context was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The decoy store.
    #[must_use]
    pub fn decoys(&self) -> &Arc<DecoyDirectory> {
        &self.decoys
    }

    /// The audit trail.
    #[must_use]
    pub fn audit(&self) -> &Arc<AuditTrail> {
        &self.audit
    }

    /// The supervisor.
    #[must_use]
    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    /// Monitor until `shutdown` resolves, then stop.
    ///
    /// A previous process may have left the persisted monitoring flag set;
    /// it is cleared first. With `auto_restart` configured the supervisor
    /// runs its restart loop alongside the watch.
    ///
    /// # Errors
    ///
    /// Returns an error if monitoring cannot be started.
    pub async fn run_until<F>(&self, shutdown: F) -> ContextResult<()>
    where
        F: Future<Output = ()>,
    {
        self.audit.set_monitoring_active(false)?;

        if self.config.monitor.auto_restart {
            self.supervisor.start_supervised().await?;
        } else {
            self.supervisor.start().await?;
        }

        shutdown.await;
        info!("shutdown requested");
        self.supervisor.stop().await;
        Ok(())
    }

    /// Combined status, statistics and supervisor snapshot.
    #[must_use]
    pub fn system_report(&self) -> SystemReport {
        SystemReport {
            status: self.audit.get_status(),
            statistics: self.audit.get_statistics(),
            monitor: self.supervisor.status(),
        }
    }

    /// Perform a real attack on a decoy so the pipeline can be exercised.
    ///
    /// `target` names a decoy file; the first decoy is used when absent.
    /// The attack reads (`accessed`), appends to (`modified`), removes
    /// (`deleted`, the decoy is restored afterwards) or renames the decoy
    /// away and back (the move kinds). When the live watch is running the
    /// simulation waits for it to record the attack; otherwise the event is
    /// recorded directly.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not a managed decoy, the filesystem
    /// operation fails, or a directly recorded event cannot be persisted.
    pub async fn simulate(
        &self,
        kind: AttackKind,
        target: Option<&str>,
    ) -> ContextResult<SimulationReport> {
        let name = match target {
            Some(name) => name.to_owned(),
            None => self
                .decoys
                .names()
                .next()
                .map(str::to_owned)
                .ok_or_else(|| ContextError::Supervisor(crate::SupervisorError::NoProtectedPaths))?,
        };
        let path = self.decoys.path_of(&name)?;
        if !path.exists() {
            self.decoys.create_missing()?;
        }

        let status_before = self.audit.get_status();
        let first_new_id = self.audit.next_id();
        let watched = self.supervisor.is_running();

        info!(kind = %kind, decoy = %name, "simulating attack");
        let content_preview = self.perform(kind, &path)?;

        let (event, detected_by_watch) = if watched {
            let event = self.await_detection(&name, first_new_id).await;
            if event.is_none() {
                warn!(decoy = %name, "simulated attack was not detected by the live watch");
            }
            (event, true)
        } else {
            (Some(self.audit.record_event(kind, &path, None, None)?), false)
        };

        Ok(SimulationReport {
            kind,
            target: path,
            content_preview,
            detected_by_watch: detected_by_watch && event.is_some(),
            event,
            status_before,
            status_after: self.audit.get_status(),
        })
    }

    fn perform(&self, kind: AttackKind, path: &Path) -> ContextResult<Option<String>> {
        let fail = |source: std::io::Error| ContextError::Simulation {
            path: path.to_path_buf(),
            source,
        };

        let content_preview = match kind {
            AttackKind::Accessed => {
                let content = std::fs::read_to_string(path).map_err(fail)?;
                Some(preview(&content, 100))
            },
            AttackKind::Modified => {
                let mut file = std::fs::OpenOptions::new()
                    .append(true)
                    .open(path)
                    .map_err(fail)?;
                file.write_all(SIMULATED_MODIFICATION.as_bytes())
                    .map_err(fail)?;
                None
            },
            AttackKind::Deleted => {
                std::fs::remove_file(path).map_err(fail)?;
                self.decoys.create_missing()?;
                None
            },
            AttackKind::MovedFrom | AttackKind::MovedTo | AttackKind::Moved => {
                let aside = path.with_extension("exfil");
                std::fs::rename(path, &aside).map_err(fail)?;
                std::fs::rename(&aside, path).map_err(fail)?;
                None
            },
        };
        Ok(content_preview)
    }

    async fn await_detection(
        &self,
        name: &str,
        first_new_id: honeytrap_audit::AttackId,
    ) -> Option<AttackEvent> {
        let deadline = tokio::time::Instant::now()
            .checked_add(SIMULATION_DETECTION_WINDOW)
            .unwrap_or_else(tokio::time::Instant::now);

        loop {
            let found = self
                .audit
                .get_recent(Some(10))
                .into_iter()
                .find(|e| e.target_name == name && e.id >= first_new_id);
            if found.is_some() || tokio::time::Instant::now() >= deadline {
                return found;
            }
            tokio::time::sleep(SIMULATION_POLL).await;
        }
    }
}

/// At most `max` characters of `content`, with an ellipsis when cut.
fn preview(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_owned(),
    }
}
