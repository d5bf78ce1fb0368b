//! Watch supervisor: start/stop lifecycle, health checks and bounded
//! auto-restart.
//!
//! Lifecycle mutations (`start`, `stop`, `restart`) serialize on an async
//! mutex that owns the live [`WatchSession`]. Counters and flags live behind
//! a separate synchronous mutex so status reads never wait on a lifecycle
//! operation in flight.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use honeytrap_audit::AuditTrail;
use honeytrap_config::MonitorSection;
use honeytrap_tokens::TokenStore;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::Backoff;
use crate::error::{ErrorClass, SupervisorError, SupervisorResult};
use crate::health::{HealthCheck, HealthReport, HealthState, derive_health};
use crate::session::{SessionProbe, WatchSession};
use crate::watchset::WatchSet;

/// Supervisor tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Time between auto-restart loop iterations.
    pub health_interval: Duration,
    /// Restarts allowed before supervision gives up.
    pub max_restarts: u32,
    /// Delay before the first restart.
    pub restart_base_delay: Duration,
    /// Cap on the restart delay.
    pub restart_max_delay: Duration,
    /// Healthy running time after which the restart budget is refilled.
    pub stability_threshold: Duration,
    /// How long a fresh watch must survive before `start` reports success.
    pub start_grace: Duration,
    /// Bound on waiting for the watch task or the loop to exit.
    pub stop_timeout: Duration,
    /// Failed restarts the loop tolerates before disabling itself.
    pub max_loop_errors: u32,
}

impl From<&MonitorSection> for SupervisorConfig {
    fn from(section: &MonitorSection) -> Self {
        Self {
            health_interval: section.health_interval(),
            max_restarts: section.max_restarts,
            restart_base_delay: section.restart_base_delay(),
            restart_max_delay: section.restart_max_delay(),
            stability_threshold: section.stability_threshold(),
            start_grace: section.start_grace(),
            stop_timeout: section.stop_timeout(),
            max_loop_errors: section.max_loop_errors,
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::from(&MonitorSection::default())
    }
}

/// Coarse lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorState {
    /// No watch.
    Stopped,
    /// A start is in progress.
    Starting,
    /// Watch running and healthy.
    Running,
    /// Running with a recorded error.
    Degraded,
    /// Running but failing repeatedly, or the watch died.
    Unhealthy,
}

/// Snapshot returned by [`Supervisor::status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorStatus {
    /// A watch session is attached.
    pub is_monitoring: bool,
    /// Attached and the session task is alive.
    pub is_running: bool,
    /// When the current (or last) session started.
    pub started_at: Option<DateTime<Utc>>,
    /// Seconds since the current session started, 0 when stopped.
    pub uptime_seconds: u64,
    /// Restarts counted against the budget.
    pub restart_count: u32,
    /// Consecutive failed health checks.
    pub error_count: u32,
    /// Most recent failure description.
    pub last_error: Option<String>,
    /// Files the token store currently protects.
    pub monitored_files: usize,
    /// Protected-file notifications seen by the current session.
    pub event_count: u64,
    /// Derived health.
    pub health_status: HealthState,
    /// The auto-restart loop is running.
    pub auto_restart_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    Starting,
    Running,
}

#[derive(Debug)]
struct Shared {
    phase: Phase,
    probe: Option<SessionProbe>,
    started_at: Option<DateTime<Utc>>,
    running_since: Option<Instant>,
    healthy_since: Option<Instant>,
    restart_count: u32,
    backoff: Backoff,
    error_count: u32,
    last_error: Option<String>,
}

impl Shared {
    fn watch_alive(&self) -> bool {
        self.probe.as_ref().is_some_and(SessionProbe::is_alive)
    }

    fn health(&self) -> HealthState {
        derive_health(
            self.phase == Phase::Running,
            self.last_error.as_deref(),
            self.error_count,
            self.watch_alive(),
        )
    }
}

/// Owns the live watch over the token store's files and keeps it alive.
pub struct Supervisor {
    config: SupervisorConfig,
    tokens: Arc<dyn TokenStore>,
    audit: Arc<AuditTrail>,
    lifecycle: tokio::sync::Mutex<Option<WatchSession>>,
    shared: Mutex<Shared>,
    shutdown: Mutex<CancellationToken>,
    auto_restart: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    /// Create a stopped supervisor.
    #[must_use]
    pub fn new(
        config: SupervisorConfig,
        tokens: Arc<dyn TokenStore>,
        audit: Arc<AuditTrail>,
    ) -> Self {
        let backoff = Backoff::new(config.restart_base_delay, config.restart_max_delay);
        Self {
            config,
            tokens,
            audit,
            lifecycle: tokio::sync::Mutex::new(None),
            shared: Mutex::new(Shared {
                phase: Phase::Stopped,
                probe: None,
                started_at: None,
                running_since: None,
                healthy_since: None,
                restart_count: 0,
                backoff,
                error_count: 0,
                last_error: None,
            }),
            shutdown: Mutex::new(CancellationToken::new()),
            auto_restart: Mutex::new(None),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shutdown_token(&self) -> CancellationToken {
        self.shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ----------------------------------------------------------------------
    // Lifecycle
    // ----------------------------------------------------------------------

    /// Start monitoring. A no-op when already running with a live watch; a
    /// session whose watch has died is torn down and replaced.
    ///
    /// Verifies (and recreates) the protected files, checks the watch root,
    /// attaches the watch and waits the start grace period to confirm it
    /// survived. Partially started resources are torn down on failure.
    ///
    /// # Errors
    ///
    /// Returns the first failing step. The message is also kept as the
    /// supervisor's last error.
    pub async fn start(&self) -> SupervisorResult<()> {
        let mut slot = self.lifecycle.lock().await;
        self.start_locked(&mut slot).await
    }

    async fn start_locked(&self, slot: &mut Option<WatchSession>) -> SupervisorResult<()> {
        let (running, alive) = {
            let shared = self.shared();
            (shared.phase == Phase::Running, shared.watch_alive())
        };
        if running {
            if alive {
                debug!("monitoring already active");
                return Ok(());
            }
            warn!("watch session is dead, replacing it");
            self.stop_locked(slot).await;
        }
        self.shared().phase = Phase::Starting;

        match self.attach().await {
            Ok(session) => {
                let probe = session.probe();
                *slot = Some(session);
                {
                    let now = Instant::now();
                    let mut shared = self.shared();
                    shared.phase = Phase::Running;
                    shared.probe = Some(probe);
                    shared.started_at = Some(Utc::now());
                    shared.running_since = Some(now);
                    shared.healthy_since = Some(now);
                    shared.error_count = 0;
                    shared.last_error = None;
                }
                if let Err(e) = self.audit.set_monitoring_active(true) {
                    warn!(error = %e, "failed to update monitoring flag");
                }
                info!(root = %self.tokens.watch_root().display(), "monitoring honey-tokens");
                Ok(())
            },
            Err(e) => {
                {
                    let mut shared = self.shared();
                    shared.phase = Phase::Stopped;
                    shared.last_error = Some(e.to_string());
                }
                error!(error = %e, "failed to start monitoring");
                Err(e)
            },
        }
    }

    async fn attach(&self) -> SupervisorResult<WatchSession> {
        let report = self.tokens.verify_and_recreate_missing()?;
        let missing: Vec<String> = report
            .into_iter()
            .filter_map(|(name, present)| (!present).then_some(name))
            .collect();
        if !missing.is_empty() {
            return Err(SupervisorError::TokensMissing { missing });
        }

        let paths = self.tokens.list_protected_paths()?;
        if paths.is_empty() {
            return Err(SupervisorError::NoProtectedPaths);
        }

        let root = self.tokens.watch_root();
        check_root(root)?;

        let set = WatchSet::new(&paths);
        debug!(files = set.len(), root = %root.display(), "attaching watch");
        let session = WatchSession::spawn(root, set, Arc::clone(&self.audit))?;

        tokio::time::sleep(self.config.start_grace).await;
        if !session.probe().is_alive() {
            session.shutdown(self.config.stop_timeout).await;
            return Err(SupervisorError::WatchDiedDuringStartup);
        }
        Ok(session)
    }

    /// Stop monitoring and end any auto-restart loop.
    ///
    /// Always converges to stopped: the loop and the watch task are each
    /// given the stop timeout before being aborted, and teardown problems
    /// are only logged.
    pub async fn stop(&self) {
        self.cancel_supervision().await;
        let mut slot = self.lifecycle.lock().await;
        self.stop_locked(&mut slot).await;
    }

    async fn cancel_supervision(&self) {
        let token = std::mem::replace(
            &mut *self.shutdown.lock().unwrap_or_else(PoisonError::into_inner),
            CancellationToken::new(),
        );
        token.cancel();

        let handle = self
            .auto_restart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut handle) = handle {
            if tokio::time::timeout(self.config.stop_timeout, &mut handle)
                .await
                .is_err()
            {
                warn!("auto-restart loop did not stop in time, aborting");
                handle.abort();
            }
        }
    }

    async fn stop_locked(&self, slot: &mut Option<WatchSession>) {
        let Some(session) = slot.take() else {
            debug!("monitoring not active");
            return;
        };

        session.shutdown(self.config.stop_timeout).await;
        {
            let mut shared = self.shared();
            shared.phase = Phase::Stopped;
            shared.probe = None;
            shared.running_since = None;
            shared.healthy_since = None;
        }
        if let Err(e) = self.audit.set_monitoring_active(false) {
            warn!(error = %e, "failed to update monitoring flag");
        }
        info!("stopped honey-token monitoring");
    }

    /// Stop, wait the current backoff delay, start again.
    ///
    /// Every attempt counts against the restart budget; a successful one
    /// doubles the next delay.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::RestartBudgetExhausted`] without touching
    /// the watch once the budget is spent, [`SupervisorError::Cancelled`] if
    /// [`stop`](Self::stop) interrupts the delay, or the start failure.
    pub async fn restart(&self) -> SupervisorResult<()> {
        let cancel = self.shutdown_token();
        self.restart_with(&cancel).await
    }

    async fn restart_with(&self, cancel: &CancellationToken) -> SupervisorResult<()> {
        let mut slot = self.lifecycle.lock().await;

        let (attempt, delay) = {
            let mut shared = self.shared();
            if shared.restart_count >= self.config.max_restarts {
                let err = SupervisorError::RestartBudgetExhausted {
                    max_restarts: self.config.max_restarts,
                };
                shared.last_error = Some(err.to_string());
                return Err(err);
            }
            shared.restart_count = shared.restart_count.saturating_add(1);
            (shared.restart_count, shared.backoff.current())
        };

        info!(
            attempt,
            max_restarts = self.config.max_restarts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "restarting monitoring"
        );

        self.stop_locked(&mut slot).await;

        tokio::select! {
            () = cancel.cancelled() => return Err(SupervisorError::Cancelled),
            () = tokio::time::sleep(delay) => {},
        }

        self.start_locked(&mut slot).await?;
        self.shared().backoff.advance();
        Ok(())
    }

    /// Refill the restart budget and reset the backoff delay.
    pub fn reset_restart_budget(&self) {
        let mut shared = self.shared();
        shared.restart_count = 0;
        shared.backoff.reset();
        info!("restart budget reset");
    }

    // ----------------------------------------------------------------------
    // Auto-restart
    // ----------------------------------------------------------------------

    /// Start monitoring, then spawn the auto-restart loop.
    ///
    /// # Errors
    ///
    /// Returns the start failure; the loop is not spawned in that case.
    pub async fn start_supervised(self: &Arc<Self>) -> SupervisorResult<()> {
        self.start().await?;
        self.spawn_auto_restart();
        Ok(())
    }

    /// Spawn the auto-restart loop. Returns `false` if one is already
    /// running.
    pub fn spawn_auto_restart(self: &Arc<Self>) -> bool {
        let mut slot = self
            .auto_restart
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("auto-restart loop already running");
            return false;
        }

        let cancel = self.shutdown_token();
        let this = Arc::clone(self);
        *slot = Some(tokio::spawn(async move { this.supervise(cancel).await }));
        true
    }

    /// Whether the auto-restart loop is running.
    #[must_use]
    pub fn auto_restart_active(&self) -> bool {
        self.auto_restart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    async fn supervise(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.config.health_interval.as_secs(),
            "auto-restart loop started"
        );
        let mut loop_errors = 0u32;

        while !cancel.is_cancelled() {
            if self.is_running() {
                self.check_health();
                self.refill_budget_if_stable();
            } else {
                warn!("monitoring detected as down, attempting restart");
                match self.restart_with(&cancel).await {
                    Ok(()) => info!("monitoring restarted"),
                    Err(SupervisorError::Cancelled) => break,
                    Err(e) if e.class() == ErrorClass::Fatal => {
                        error!(error = %e, "auto-restart disabled");
                        break;
                    },
                    Err(e) => {
                        loop_errors = loop_errors.saturating_add(1);
                        warn!(error = %e, loop_errors, "restart attempt failed");
                        if loop_errors > self.config.max_loop_errors {
                            error!("too many errors in auto-restart loop, stopping");
                            break;
                        }
                    },
                }
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.health_interval) => {},
            }
        }

        info!("auto-restart loop stopped");
    }

    fn refill_budget_if_stable(&self) {
        let mut shared = self.shared();
        let stable = shared
            .healthy_since
            .is_some_and(|t| t.elapsed() > self.config.stability_threshold);
        if stable && shared.restart_count > 0 {
            shared.restart_count = 0;
            shared.backoff.reset();
            info!("monitoring stable, restart budget refilled");
        }
    }

    // ----------------------------------------------------------------------
    // Health
    // ----------------------------------------------------------------------

    /// Run every health check and fold the result into the error counters.
    ///
    /// A failing pass bumps the consecutive error count and records the
    /// failures as the last error; a clean pass clears both. Missing decoys
    /// are recreated as part of the token check.
    pub fn check_health(&self) -> HealthReport {
        let mut checks = Vec::with_capacity(4);

        let t = Instant::now();
        let alive = self.shared().watch_alive();
        checks.push(if alive {
            HealthCheck::passed("watch", t.elapsed())
        } else {
            HealthCheck::failed("watch", "watch session is not alive", t.elapsed())
        });

        let t = Instant::now();
        checks.push(match self.tokens.verify_and_recreate_missing() {
            Ok(report) => {
                let missing: Vec<String> = report
                    .into_iter()
                    .filter_map(|(name, present)| (!present).then_some(name))
                    .collect();
                if missing.is_empty() {
                    HealthCheck::passed("tokens", t.elapsed())
                } else {
                    HealthCheck::failed(
                        "tokens",
                        format!("missing after recreation: {}", missing.join(", ")),
                        t.elapsed(),
                    )
                }
            },
            Err(e) => HealthCheck::failed("tokens", e.to_string(), t.elapsed()),
        });

        let t = Instant::now();
        let root = self.tokens.watch_root();
        checks.push(match check_root(root) {
            Ok(()) => HealthCheck::passed("watch_root", t.elapsed()),
            Err(e) => HealthCheck::failed("watch_root", e.to_string(), t.elapsed()),
        });

        let t = Instant::now();
        checks.push(match self.audit.try_status() {
            Ok(_) => HealthCheck::passed("audit", t.elapsed()),
            Err(e) => HealthCheck::failed("audit", e.to_string(), t.elapsed()),
        });

        let report = HealthReport::from_checks(checks);
        let mut shared = self.shared();
        if let Some(summary) = report.error_summary() {
            shared.error_count = shared.error_count.saturating_add(1);
            shared.healthy_since = Some(Instant::now());
            warn!(error_count = shared.error_count, error = %summary, "health check failed");
            shared.last_error = Some(summary);
        } else {
            shared.error_count = 0;
            shared.last_error = None;
            debug!("health check passed");
        }
        report
    }

    // ----------------------------------------------------------------------
    // Queries
    // ----------------------------------------------------------------------

    /// Whether a watch is attached and its task alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        let shared = self.shared();
        shared.phase == Phase::Running && shared.watch_alive()
    }

    /// Derived health.
    #[must_use]
    pub fn health(&self) -> HealthState {
        self.shared().health()
    }

    /// Coarse lifecycle state.
    #[must_use]
    pub fn state(&self) -> SupervisorState {
        let shared = self.shared();
        match shared.phase {
            Phase::Stopped => SupervisorState::Stopped,
            Phase::Starting => SupervisorState::Starting,
            Phase::Running => match shared.health() {
                HealthState::Healthy => SupervisorState::Running,
                HealthState::Degraded => SupervisorState::Degraded,
                HealthState::Unhealthy => SupervisorState::Unhealthy,
                HealthState::Stopped => SupervisorState::Stopped,
            },
        }
    }

    /// Status snapshot.
    #[must_use]
    pub fn status(&self) -> SupervisorStatus {
        let monitored_files = match self.tokens.list_protected_paths() {
            Ok(paths) => paths.len(),
            Err(e) => {
                warn!(error = %e, "failed to list honey-token paths");
                0
            },
        };
        let auto_restart_active = self.auto_restart_active();

        let shared = self.shared();
        let is_monitoring = shared.phase == Phase::Running;
        SupervisorStatus {
            is_monitoring,
            is_running: is_monitoring && shared.watch_alive(),
            started_at: shared.started_at,
            uptime_seconds: if is_monitoring {
                shared.running_since.map_or(0, |t| t.elapsed().as_secs())
            } else {
                0
            },
            restart_count: shared.restart_count,
            error_count: shared.error_count,
            last_error: shared.last_error.clone(),
            monitored_files,
            event_count: shared.probe.as_ref().map_or(0, SessionProbe::event_count),
            health_status: shared.health(),
            auto_restart_active,
        }
    }

    /// Kill the live watch task as if it had crashed. Returns `false` when
    /// no watch is attached.
    #[cfg(any(test, feature = "test-support"))]
    pub async fn kill_watch(&self) -> bool {
        let slot = self.lifecycle.lock().await;
        match slot.as_ref() {
            Some(session) => {
                session.abort();
                true
            },
            None => false,
        }
    }
}

fn check_root(root: &Path) -> SupervisorResult<()> {
    if !root.is_dir() {
        return Err(SupervisorError::WatchRootMissing(root.to_path_buf()));
    }
    std::fs::read_dir(root).map_err(|e| SupervisorError::WatchRootUnreadable {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use honeytrap_test::{ScriptedTokenStore, VerifyOutcome};
    use honeytrap_tokens::DecoyDirectory;

    use super::*;

    fn fast_config() -> SupervisorConfig {
        SupervisorConfig {
            health_interval: Duration::from_millis(50),
            max_restarts: 5,
            restart_base_delay: Duration::from_millis(1),
            restart_max_delay: Duration::from_millis(8),
            stability_threshold: Duration::from_secs(300),
            start_grace: Duration::from_millis(20),
            stop_timeout: Duration::from_secs(2),
            max_loop_errors: 10,
        }
    }

    fn decoy_supervisor(config: SupervisorConfig) -> (tempfile::TempDir, Arc<Supervisor>) {
        let dir = tempfile::tempdir().unwrap();
        let decoys = DecoyDirectory::new(dir.path().join("tokens")).unwrap();
        decoys.create_all().unwrap();
        let audit = Arc::new(AuditTrail::in_memory().unwrap());
        let sup = Arc::new(Supervisor::new(config, Arc::new(decoys), audit));
        (dir, sup)
    }

    fn scripted_supervisor(
        config: SupervisorConfig,
    ) -> (tempfile::TempDir, Arc<ScriptedTokenStore>, Arc<Supervisor>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        let store = Arc::new(ScriptedTokenStore::new(
            dir.path(),
            vec![dir.path().join("a.txt")],
        ));
        let audit = Arc::new(AuditTrail::in_memory().unwrap());
        let sup = Arc::new(Supervisor::new(
            config,
            Arc::clone(&store) as Arc<dyn TokenStore>,
            audit,
        ));
        (dir, store, sup)
    }

    #[test]
    fn test_config_from_defaults() {
        let config = SupervisorConfig::default();
        assert_eq!(config.health_interval, Duration::from_secs(30));
        assert_eq!(config.max_restarts, 5);
        assert_eq!(config.restart_base_delay, Duration::from_secs(1));
        assert_eq!(config.restart_max_delay, Duration::from_secs(60));
        assert_eq!(config.stability_threshold, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let (_dir, sup) = decoy_supervisor(fast_config());
        assert_eq!(sup.state(), SupervisorState::Stopped);
        assert_eq!(sup.health(), HealthState::Stopped);

        sup.start().await.unwrap();
        assert!(sup.is_running());
        assert_eq!(sup.state(), SupervisorState::Running);
        assert!(sup.audit.get_status().monitoring_active());

        let status = sup.status();
        assert!(status.is_monitoring);
        assert_eq!(status.monitored_files, 5);
        assert_eq!(status.health_status, HealthState::Healthy);
        assert!(status.started_at.is_some());

        sup.stop().await;
        assert!(!sup.is_running());
        assert!(!sup.audit.get_status().monitoring_active());
        assert_eq!(sup.status().uptime_seconds, 0);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (_dir, store, sup) = scripted_supervisor(fast_config());

        sup.start().await.unwrap();
        sup.start().await.unwrap();
        assert_eq!(store.verify_calls(), 1);
        assert!(sup.is_running());
        sup.stop().await;
    }

    #[tokio::test]
    async fn test_stop_when_stopped_is_noop() {
        let (_dir, sup) = decoy_supervisor(fast_config());
        sup.stop().await;
        assert_eq!(sup.state(), SupervisorState::Stopped);
    }

    #[tokio::test]
    async fn test_start_recreates_missing_token() {
        let (dir, sup) = decoy_supervisor(fast_config());
        let victim = dir.path().join("tokens").join("ssh_keys.txt");
        std::fs::remove_file(&victim).unwrap();

        sup.start().await.unwrap();
        assert!(victim.is_file());
        sup.stop().await;
    }

    #[tokio::test]
    async fn test_start_fails_when_tokens_stay_missing() {
        let (_dir, store, sup) = scripted_supervisor(fast_config());
        store.push_verify(VerifyOutcome::Missing(vec!["a.txt".into()]));

        let err = sup.start().await.unwrap_err();
        assert!(matches!(err, SupervisorError::TokensMissing { .. }));
        assert_eq!(sup.state(), SupervisorState::Stopped);
        assert!(sup.status().last_error.unwrap().contains("a.txt"));
    }

    #[tokio::test]
    async fn test_start_fails_without_paths() {
        let (_dir, store, sup) = scripted_supervisor(fast_config());
        store.set_paths(Vec::new());

        let err = sup.start().await.unwrap_err();
        assert!(matches!(err, SupervisorError::NoProtectedPaths));
        assert_eq!(err.class(), ErrorClass::Configuration);
    }

    #[tokio::test]
    async fn test_start_fails_on_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        let store = Arc::new(ScriptedTokenStore::new(&root, vec![root.join("a.txt")]));
        let audit = Arc::new(AuditTrail::in_memory().unwrap());
        let sup = Supervisor::new(fast_config(), store, audit);

        let err = sup.start().await.unwrap_err();
        assert!(matches!(err, SupervisorError::WatchRootMissing(_)));
    }

    #[tokio::test]
    async fn test_restart_budget() {
        let config = SupervisorConfig {
            max_restarts: 2,
            ..fast_config()
        };
        let (_dir, store, sup) = scripted_supervisor(config);
        sup.start().await.unwrap();

        sup.restart().await.unwrap();
        sup.restart().await.unwrap();
        let calls = store.verify_calls();

        let err = sup.restart().await.unwrap_err();
        assert!(matches!(
            err,
            SupervisorError::RestartBudgetExhausted { max_restarts: 2 }
        ));
        assert_eq!(store.verify_calls(), calls, "no start after exhaustion");
        assert!(sup.is_running(), "exhaustion leaves the watch alone");
        assert_eq!(sup.status().restart_count, 2);
        assert_eq!(sup.health(), HealthState::Degraded);

        sup.reset_restart_budget();
        sup.restart().await.unwrap();
        sup.stop().await;
    }

    #[tokio::test]
    async fn test_failed_restart_counts_against_budget() {
        let config = SupervisorConfig {
            max_restarts: 1,
            ..fast_config()
        };
        let (_dir, store, sup) = scripted_supervisor(config);
        store.push_verify(VerifyOutcome::Unavailable("offline".into()));

        assert!(sup.restart().await.is_err());
        assert!(matches!(
            sup.restart().await.unwrap_err(),
            SupervisorError::RestartBudgetExhausted { .. }
        ));
    }

    #[tokio::test]
    async fn test_health_check_passes_and_fails() {
        let (_dir, store, sup) = scripted_supervisor(fast_config());
        sup.start().await.unwrap();

        let report = sup.check_health();
        assert!(report.is_healthy(), "{:?}", report.failures());

        store.push_verify(VerifyOutcome::Missing(vec!["a.txt".into()]));
        assert!(!sup.check_health().is_healthy());
        assert_eq!(sup.health(), HealthState::Degraded);

        for _ in 0..3 {
            store.push_verify(VerifyOutcome::Missing(vec!["a.txt".into()]));
            assert!(!sup.check_health().is_healthy());
        }
        let status = sup.status();
        assert_eq!(status.error_count, 4);
        assert_eq!(status.health_status, HealthState::Unhealthy);
        assert_eq!(sup.state(), SupervisorState::Unhealthy);
        assert!(status.last_error.unwrap().contains("tokens"));

        assert!(sup.check_health().is_healthy());
        assert_eq!(sup.health(), HealthState::Healthy);
        sup.stop().await;
    }

    #[tokio::test]
    async fn test_dead_watch_is_unhealthy() {
        let (_dir, sup) = decoy_supervisor(fast_config());
        sup.start().await.unwrap();
        assert!(sup.kill_watch().await);

        for _ in 0..50 {
            if !sup.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!sup.is_running());
        assert_eq!(sup.health(), HealthState::Unhealthy);
        assert_eq!(sup.state(), SupervisorState::Unhealthy);
        sup.stop().await;
    }

    #[tokio::test]
    async fn test_auto_restart_revives_dead_watch() {
        let (_dir, sup) = decoy_supervisor(fast_config());
        sup.start_supervised().await.unwrap();
        assert!(sup.auto_restart_active());
        assert!(!sup.spawn_auto_restart());

        sup.kill_watch().await;
        let mut revived = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if sup.is_running() && sup.status().restart_count >= 1 {
                revived = true;
                break;
            }
        }
        assert!(revived, "watch was not restarted: {:?}", sup.status());

        sup.stop().await;
        assert!(!sup.auto_restart_active());
        assert_eq!(sup.state(), SupervisorState::Stopped);
    }

    #[tokio::test]
    async fn test_start_replaces_dead_session() {
        let (_dir, sup) = decoy_supervisor(fast_config());
        sup.start().await.unwrap();
        assert!(sup.kill_watch().await);

        for _ in 0..50 {
            if !sup.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!sup.is_running());

        sup.start().await.unwrap();
        assert!(sup.is_running());
        assert_eq!(sup.health(), HealthState::Healthy);
        assert_eq!(sup.status().restart_count, 0);
        sup.stop().await;
    }

    #[tokio::test]
    async fn test_stable_monitoring_refills_budget() {
        let config = SupervisorConfig {
            health_interval: Duration::from_millis(20),
            stability_threshold: Duration::from_millis(50),
            ..fast_config()
        };
        let base = config.restart_base_delay;
        let (_dir, sup) = decoy_supervisor(config);
        sup.start_supervised().await.unwrap();

        sup.restart().await.unwrap();
        assert!(sup.status().restart_count >= 1);
        assert!(sup.shared().backoff.current() > base);

        let mut refilled = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if sup.status().restart_count == 0 {
                refilled = true;
                break;
            }
        }
        assert!(refilled, "budget never refilled: {:?}", sup.status());
        assert_eq!(sup.shared().backoff.current(), base);
        assert!(sup.is_running());

        sup.stop().await;
    }

    #[tokio::test]
    async fn test_loop_disables_itself_when_budget_exhausted() {
        let config = SupervisorConfig {
            max_restarts: 1,
            ..fast_config()
        };
        let (_dir, store, sup) = scripted_supervisor(config);
        sup.start_supervised().await.unwrap();

        for _ in 0..3 {
            store.push_verify(VerifyOutcome::Unavailable("offline".into()));
        }
        sup.kill_watch().await;

        let mut disabled = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if !sup.auto_restart_active() {
                disabled = true;
                break;
            }
        }
        assert!(disabled, "loop kept running: {:?}", sup.status());
        assert!(sup.status().last_error.unwrap().contains("maximum restart"));
        sup.stop().await;
    }

    #[tokio::test]
    async fn test_stop_interrupts_backoff() {
        let config = SupervisorConfig {
            restart_base_delay: Duration::from_secs(60),
            restart_max_delay: Duration::from_secs(60),
            ..fast_config()
        };
        let (_dir, sup) = decoy_supervisor(config);
        sup.start_supervised().await.unwrap();
        sup.kill_watch().await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        let began = Instant::now();
        sup.stop().await;
        assert!(began.elapsed() < Duration::from_secs(2));
        assert!(!sup.auto_restart_active());
        assert_eq!(sup.state(), SupervisorState::Stopped);
    }
}
