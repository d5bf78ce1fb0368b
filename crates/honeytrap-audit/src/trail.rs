//! The audit trail: single-writer owner of the event store and status record.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::actor::{ActorResolver, ProcessActorResolver};
use crate::error::AuditResult;
use crate::event::{Actor, AttackEvent, AttackId, AttackKind, LOOPBACK};
use crate::stats::Stats;
use crate::status::{StatusRecord, SystemStatus};
use crate::storage::{EventStore, JsonFileStore, MemoryEventStore};

/// Default number of events returned by [`AuditTrail::get_recent`].
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Upper bound for [`AuditTrail::get_recent`].
pub const MAX_RECENT_LIMIT: usize = 100;

/// Clamp a requested recent-events limit.
///
/// Values in `1..=100` pass through; anything else (including a missing
/// value) becomes [`DEFAULT_RECENT_LIMIT`].
#[must_use]
pub fn clamp_recent_limit(requested: Option<i64>) -> usize {
    requested
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| (1..=MAX_RECENT_LIMIT).contains(n))
        .unwrap_or(DEFAULT_RECENT_LIMIT)
}

/// Parse and clamp a raw limit, e.g. from a query string.
#[must_use]
pub fn parse_recent_limit(raw: Option<&str>) -> usize {
    clamp_recent_limit(raw.and_then(|s| s.trim().parse::<i64>().ok()))
}

/// In-memory state guarded by the trail's lock.
#[derive(Debug)]
struct TrailState {
    next_id: AttackId,
}

/// Durable record of attack events plus the derived system status.
///
/// `record_event`, `reset` and `set_monitoring_active` run under an exclusive
/// lock, plus the store's own lock when other processes share it; reads
/// share the in-process lock only. Every persisted write is atomic, so readers never
/// observe a partially written collection.
pub struct AuditTrail {
    store: Box<dyn EventStore>,
    actors: Box<dyn ActorResolver>,
    state: RwLock<TrailState>,
}

impl std::fmt::Debug for AuditTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditTrail")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AuditTrail {
    /// Open a trail backed by JSON files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the initial
    /// status record cannot be written.
    pub fn open(dir: impl Into<PathBuf>) -> AuditResult<Self> {
        Self::with_store(Box::new(JsonFileStore::open(dir)?))
    }

    /// Open a volatile trail.
    ///
    /// # Errors
    ///
    /// Infallible in practice; kept fallible to match [`AuditTrail::open`].
    pub fn in_memory() -> AuditResult<Self> {
        Self::with_store(Box::new(MemoryEventStore::new()))
    }

    /// Open a trail over any store, describing actors from the current
    /// process.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial status record cannot be written.
    pub fn with_store(store: Box<dyn EventStore>) -> AuditResult<Self> {
        Self::with_parts(store, Box::new(ProcessActorResolver))
    }

    /// Open a trail over any store and actor resolver.
    ///
    /// Identifiers follow the highest persisted id; a corrupt or absent
    /// event collection starts them at [`AttackId::FIRST`]. A missing or
    /// unreadable status record is replaced by a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be locked or the initial status
    /// record cannot be written.
    pub fn with_parts(
        store: Box<dyn EventStore>,
        actors: Box<dyn ActorResolver>,
    ) -> AuditResult<Self> {
        let _lock = store.lock()?;
        let events = load_events_lenient(store.as_ref());
        let next_id = next_after(&events);

        match store.load_status() {
            Ok(Some(_)) => {},
            Ok(None) => {
                store.save_status(&StatusRecord::fresh(Utc::now()))?;
                debug!("initialized system status");
            },
            Err(e) => {
                warn!(error = %e, "unreadable system status, reinitializing");
                store.save_status(&StatusRecord::fresh(Utc::now()))?;
            },
        }

        info!(next_id = %next_id, events = events.len(), "audit trail opened");

        Ok(Self {
            store,
            actors,
            state: RwLock::new(TrailState { next_id }),
        })
    }

    /// Record an attack and flip the status to `UNDER_ATTACK`.
    ///
    /// A missing `actor` is looked up best-effort and degrades to
    /// [`Actor::unknown`]; a missing `source_address` defaults to loopback.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be locked, the event log cannot
    /// be read, or the event or the updated status cannot be persisted. A
    /// corrupt log is replaced rather than reported. The identifier is only
    /// consumed once the event is stored.
    pub fn record_event(
        &self,
        kind: AttackKind,
        path: &Path,
        actor: Option<Actor>,
        source_address: Option<IpAddr>,
    ) -> AuditResult<AttackEvent> {
        let actor = actor
            .or_else(|| self.actors.resolve())
            .unwrap_or_else(Actor::unknown);
        let source_address = source_address.unwrap_or(LOOPBACK);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.store.lock()?;

        // Ids follow the persisted log so every process sharing the store
        // agrees on them, including after a reset elsewhere.
        let (mut events, id) = match self.store.load_events() {
            Ok(events) => {
                let id = next_after(&events);
                (events, id)
            },
            Err(e) if e.is_corruption() => {
                warn!(error = %e, "attack log is corrupt; replacing it");
                (Vec::new(), state.next_id)
            },
            Err(e) => return Err(e),
        };

        let event = AttackEvent::new(id, Utc::now(), kind, path, actor, source_address);

        events.push(event.clone());
        self.store.save_events(&events)?;
        state.next_id = id.next();

        let mut status = self.load_status_lenient();
        status.record_attack(event.occurred_at);
        if let Err(e) = self.store.save_status(&status) {
            error!(attack_id = %event.id, error = %e, "event stored but status update failed");
            return Err(e);
        }

        warn!(
            attack_id = %event.id,
            kind = %event.kind,
            path = %event.target_path.display(),
            process = %event.actor.process_name,
            "attack recorded"
        );
        Ok(event)
    }

    /// Current status with uptime computed now. Falls back to a fresh `SAFE`
    /// status if the record cannot be loaded.
    #[must_use]
    pub fn get_status(&self) -> SystemStatus {
        match self.try_status() {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "failed to load system status");
                SystemStatus::fresh(Utc::now())
            },
        }
    }

    /// Current status, surfacing load failures. Used by health checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the status record cannot be read or decoded.
    pub fn try_status(&self) -> AuditResult<SystemStatus> {
        let _guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        Ok(self
            .store
            .load_status()?
            .map_or_else(|| SystemStatus::fresh(now), |record| record.project(now)))
    }

    /// Up to `limit` events, most recent first. See [`clamp_recent_limit`].
    #[must_use]
    pub fn get_recent(&self, limit: Option<i64>) -> Vec<AttackEvent> {
        let limit = clamp_recent_limit(limit);
        let mut events = self.get_all();
        events.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        events.truncate(limit);
        events
    }

    /// Every event in storage order; empty if the store is absent or corrupt.
    #[must_use]
    pub fn get_all(&self) -> Vec<AttackEvent> {
        let _guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        load_events_lenient(self.store.as_ref())
    }

    /// Clear every event and restore a fresh `SAFE` status.
    ///
    /// Returns `false` if persistence could not be cleared. A failed status
    /// write restores the cleared events, and the identifier counter is only
    /// rewound once both writes succeed.
    pub fn reset(&self) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let _lock = match self.store.lock() {
            Ok(lock) => lock,
            Err(e) => {
                error!(error = %e, "failed to lock audit store for reset");
                return false;
            },
        };

        let snapshot = match self.store.load_events() {
            Ok(events) => Some(events),
            Err(e) if e.is_corruption() => None,
            Err(e) => {
                error!(error = %e, "failed to read attack events before reset");
                return false;
            },
        };

        if let Err(e) = self.store.clear_events() {
            error!(error = %e, "failed to clear attack events");
            return false;
        }
        if let Err(e) = self.store.save_status(&StatusRecord::fresh(Utc::now())) {
            error!(error = %e, "failed to reset system status");
            if let Some(events) = snapshot {
                if let Err(e) = self.store.save_events(&events) {
                    error!(error = %e, events = events.len(), "failed to restore attack events");
                }
            }
            return false;
        }

        state.next_id = AttackId::FIRST;
        info!("audit trail reset");
        true
    }

    /// Update only the monitoring flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the status record cannot be persisted.
    pub fn set_monitoring_active(&self, active: bool) -> AuditResult<()> {
        let _state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.store.lock()?;
        let mut status = self.load_status_lenient();
        status.monitoring_active = active;
        self.store.save_status(&status)?;
        debug!(active, "monitoring flag updated");
        Ok(())
    }

    /// Aggregate statistics over every event.
    #[must_use]
    pub fn get_statistics(&self) -> Stats {
        Stats::from_events(&self.get_all())
    }

    /// The identifier the next recorded event will receive, unless another
    /// writer records first.
    #[must_use]
    pub fn next_id(&self) -> AttackId {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match self.store.load_events() {
            Ok(events) => next_after(&events),
            Err(_) => state.next_id,
        }
    }

    fn load_status_lenient(&self) -> StatusRecord {
        match self.store.load_status() {
            Ok(Some(record)) => record,
            Ok(None) => StatusRecord::fresh(Utc::now()),
            Err(e) => {
                warn!(error = %e, "unreadable system status, starting fresh");
                StatusRecord::fresh(Utc::now())
            },
        }
    }
}

fn next_after(events: &[AttackEvent]) -> AttackId {
    events
        .iter()
        .map(|e| e.id)
        .max()
        .map_or(AttackId::FIRST, AttackId::next)
}

fn load_events_lenient(store: &dyn EventStore) -> Vec<AttackEvent> {
    match store.load_events() {
        Ok(events) => events,
        Err(e) if e.is_corruption() => {
            warn!(error = %e, "attack log is corrupt; treating as empty until next write");
            Vec::new()
        },
        Err(e) => {
            warn!(error = %e, "failed to load attack log");
            Vec::new()
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::actor::NoActorResolver;
    use crate::error::AuditError;
    use crate::status::ThreatLevel;

    fn trail_in(dir: &Path) -> AuditTrail {
        AuditTrail::with_parts(
            Box::new(JsonFileStore::open(dir).unwrap()),
            Box::new(NoActorResolver),
        )
        .unwrap()
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(clamp_recent_limit(None), 10);
        assert_eq!(clamp_recent_limit(Some(0)), 10);
        assert_eq!(clamp_recent_limit(Some(-3)), 10);
        assert_eq!(clamp_recent_limit(Some(101)), 10);
        assert_eq!(clamp_recent_limit(Some(1)), 1);
        assert_eq!(clamp_recent_limit(Some(100)), 100);
        assert_eq!(parse_recent_limit(Some("25")), 25);
        assert_eq!(parse_recent_limit(Some("abc")), 10);
        assert_eq!(parse_recent_limit(None), 10);
    }

    #[test]
    fn test_first_event_flips_status() {
        let dir = tempfile::tempdir().unwrap();
        let trail = trail_in(dir.path());

        let event = trail
            .record_event(
                AttackKind::Accessed,
                Path::new("/tok/passwords.txt"),
                None,
                None,
            )
            .unwrap();

        let status = trail.get_status();
        assert_eq!(status.state(), ThreatLevel::UnderAttack);
        assert_eq!(status.total_attacks(), 1);
        assert_eq!(status.record.last_attack_at, Some(event.occurred_at));
        assert_eq!(trail.get_recent(Some(1))[0].id, event.id);
        assert_eq!(event.actor, Actor::unknown());
        assert_eq!(event.source_address, LOOPBACK);
        assert_eq!(event.target_name, "passwords.txt");
    }

    #[test]
    fn test_ids_strictly_increase() {
        let trail = AuditTrail::in_memory().unwrap();
        let ids: Vec<AttackId> = (0..5)
            .map(|_| {
                trail
                    .record_event(AttackKind::Modified, Path::new("/t/x"), None, None)
                    .unwrap()
                    .id
            })
            .collect();
        assert_eq!(ids[0], AttackId::FIRST);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let trail = trail_in(dir.path());
            for _ in 0..3 {
                trail
                    .record_event(AttackKind::Deleted, Path::new("/t/a"), None, None)
                    .unwrap();
            }
        }

        let reopened = trail_in(dir.path());
        assert_eq!(reopened.next_id(), AttackId::new(4));
        let event = reopened
            .record_event(AttackKind::Deleted, Path::new("/t/a"), None, None)
            .unwrap();
        assert_eq!(event.id, AttackId::new(4));
        assert_eq!(reopened.get_status().total_attacks(), 4);
    }

    #[test]
    fn test_corrupt_log_degrades_to_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("attacks.json"), "not json").unwrap();

        let trail = trail_in(dir.path());
        assert!(trail.get_all().is_empty());
        assert_eq!(trail.next_id(), AttackId::FIRST);

        trail
            .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
            .unwrap();
        assert_eq!(trail.get_all().len(), 1);
    }

    #[test]
    fn test_corrupt_status_reads_as_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let trail = trail_in(dir.path());
        std::fs::write(dir.path().join("system_status.json"), "{").unwrap();

        let status = trail.get_status();
        assert_eq!(status.state(), ThreatLevel::Safe);
        assert_eq!(status.uptime_seconds, 0);
        assert!(trail.try_status().is_err());
    }

    #[test]
    fn test_reset_restores_safe_state() {
        let dir = tempfile::tempdir().unwrap();
        let trail = trail_in(dir.path());
        trail.set_monitoring_active(true).unwrap();
        for _ in 0..2 {
            trail
                .record_event(AttackKind::Modified, Path::new("/t/a"), None, None)
                .unwrap();
        }

        assert!(trail.reset());

        assert!(trail.get_all().is_empty());
        let status = trail.get_status();
        assert_eq!(status.state(), ThreatLevel::Safe);
        assert_eq!(status.total_attacks(), 0);
        assert!(status.record.last_attack_at.is_none());
        assert!(!status.monitoring_active());

        let next = trail
            .record_event(AttackKind::Modified, Path::new("/t/a"), None, None)
            .unwrap();
        assert_eq!(next.id, AttackId::FIRST);
    }

    #[test]
    fn test_monitoring_flag_independent_of_state() {
        let trail = AuditTrail::in_memory().unwrap();
        trail.set_monitoring_active(true).unwrap();
        assert!(trail.get_status().monitoring_active());
        assert_eq!(trail.get_status().state(), ThreatLevel::Safe);

        trail
            .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
            .unwrap();
        trail.set_monitoring_active(false).unwrap();
        let status = trail.get_status();
        assert!(!status.monitoring_active());
        assert_eq!(status.state(), ThreatLevel::UnderAttack);
    }

    #[test]
    fn test_recent_is_newest_first_and_bounded() {
        let trail = AuditTrail::in_memory().unwrap();
        for _ in 0..15 {
            trail
                .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
                .unwrap();
        }

        let recent = trail.get_recent(Some(3));
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, AttackId::new(15));
        assert_eq!(recent[2].id, AttackId::new(13));
        assert_eq!(trail.get_recent(Some(500)).len(), 10);
        assert_eq!(trail.get_recent(None).len(), 10);
    }

    #[test]
    fn test_statistics_scenario() {
        let trail = AuditTrail::in_memory().unwrap();
        for _ in 0..3 {
            trail
                .record_event(AttackKind::Accessed, Path::new("/t/a.txt"), None, None)
                .unwrap();
        }
        trail
            .record_event(AttackKind::Deleted, Path::new("/t/b.txt"), None, None)
            .unwrap();

        let stats = trail.get_statistics();
        assert_eq!(stats.total_attacks, 4);
        assert_eq!(stats.targeted_files["a.txt"], 3);
        assert_eq!(stats.most_targeted_file.as_deref(), Some("a.txt"));
        assert_eq!(stats.most_common_event, Some(AttackKind::Accessed));
    }

    #[test]
    fn test_concurrent_records_are_unique_and_complete() {
        let dir = tempfile::tempdir().unwrap();
        let trail = trail_in(dir.path());
        let n = 16;

        std::thread::scope(|scope| {
            for i in 0..n {
                let trail = &trail;
                scope.spawn(move || {
                    let path = PathBuf::from(format!("/t/file-{i}.txt"));
                    trail
                        .record_event(AttackKind::Modified, &path, None, None)
                        .unwrap();
                });
            }
        });

        let events = trail.get_all();
        assert_eq!(events.len(), n);
        let mut ids: Vec<AttackId> = events.iter().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "storage order follows ids");
        ids.dedup();
        assert_eq!(ids.len(), n);
        assert_eq!(trail.get_status().total_attacks(), n as u64);
    }

    #[test]
    fn test_explicit_actor_and_address_are_kept() {
        let trail = AuditTrail::in_memory().unwrap();
        let actor = Actor {
            process_name: "cat".to_owned(),
            process_id: Some(4242),
            username: "mallory".to_owned(),
            command_line: "cat passwords.txt".to_owned(),
        };
        let addr: IpAddr = "10.0.0.7".parse().unwrap();

        let event = trail
            .record_event(
                AttackKind::Accessed,
                Path::new("/t/passwords.txt"),
                Some(actor.clone()),
                Some(addr),
            )
            .unwrap();
        assert_eq!(event.actor, actor);
        assert_eq!(event.source_address, addr);
    }

    /// Store whose operations can be switched to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryEventStore,
        fail_clear: Arc<AtomicBool>,
        fail_load: Arc<AtomicBool>,
        fail_save_status: Arc<AtomicBool>,
    }

    impl EventStore for FlakyStore {
        fn load_events(&self) -> AuditResult<Vec<AttackEvent>> {
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(AuditError::Io(std::io::Error::other("EIO")));
            }
            self.inner.load_events()
        }
        fn save_events(&self, events: &[AttackEvent]) -> AuditResult<()> {
            self.inner.save_events(events)
        }
        fn load_status(&self) -> AuditResult<Option<StatusRecord>> {
            self.inner.load_status()
        }
        fn save_status(&self, status: &StatusRecord) -> AuditResult<()> {
            if self.fail_save_status.load(Ordering::SeqCst) {
                return Err(AuditError::StorageError("read-only filesystem".to_owned()));
            }
            self.inner.save_status(status)
        }
        fn clear_events(&self) -> AuditResult<()> {
            if self.fail_clear.load(Ordering::SeqCst) {
                return Err(AuditError::StorageError("disk on fire".to_owned()));
            }
            self.inner.clear_events()
        }
    }

    fn flaky_trail(store: FlakyStore) -> AuditTrail {
        AuditTrail::with_parts(Box::new(store), Box::new(NoActorResolver)).unwrap()
    }

    #[test]
    fn test_failed_reset_leaves_state_untouched() {
        let fail_clear = Arc::new(AtomicBool::new(true));
        let trail = flaky_trail(FlakyStore {
            fail_clear: Arc::clone(&fail_clear),
            ..FlakyStore::default()
        });
        trail
            .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
            .unwrap();

        assert!(!trail.reset());
        assert_eq!(trail.get_all().len(), 1);
        assert_eq!(trail.next_id(), AttackId::new(2));
        assert_eq!(trail.get_status().state(), ThreatLevel::UnderAttack);

        fail_clear.store(false, Ordering::SeqCst);
        assert!(trail.reset());
        assert_eq!(trail.next_id(), AttackId::FIRST);
    }

    #[test]
    fn test_failed_status_write_restores_events() {
        let fail_save_status = Arc::new(AtomicBool::new(false));
        let trail = flaky_trail(FlakyStore {
            fail_save_status: Arc::clone(&fail_save_status),
            ..FlakyStore::default()
        });
        for _ in 0..3 {
            trail
                .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
                .unwrap();
        }

        fail_save_status.store(true, Ordering::SeqCst);
        assert!(!trail.reset());

        assert_eq!(trail.get_all().len(), 3);
        let status = trail.get_status();
        assert_eq!(status.state(), ThreatLevel::UnderAttack);
        assert_eq!(status.total_attacks(), 3);
        assert_eq!(trail.next_id(), AttackId::new(4));
    }

    #[test]
    fn test_transient_read_failure_does_not_truncate_log() {
        let fail_load = Arc::new(AtomicBool::new(false));
        let trail = flaky_trail(FlakyStore {
            fail_load: Arc::clone(&fail_load),
            ..FlakyStore::default()
        });
        for _ in 0..3 {
            trail
                .record_event(AttackKind::Modified, Path::new("/t/a"), None, None)
                .unwrap();
        }

        fail_load.store(true, Ordering::SeqCst);
        let err = trail
            .record_event(AttackKind::Modified, Path::new("/t/a"), None, None)
            .unwrap_err();
        assert!(matches!(err, AuditError::Io(_)));
        assert!(!trail.reset());

        fail_load.store(false, Ordering::SeqCst);
        assert_eq!(trail.get_all().len(), 3);
        assert_eq!(trail.get_status().total_attacks(), 3);
        let next = trail
            .record_event(AttackKind::Modified, Path::new("/t/a"), None, None)
            .unwrap();
        assert_eq!(next.id, AttackId::new(4));
    }

    #[test]
    fn test_trails_sharing_a_directory_agree_on_ids() {
        let dir = tempfile::tempdir().unwrap();
        let daemon = trail_in(dir.path());
        daemon
            .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
            .unwrap();

        let cli = trail_in(dir.path());
        let from_cli = cli
            .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
            .unwrap();
        let from_daemon = daemon
            .record_event(AttackKind::Accessed, Path::new("/t/a"), None, None)
            .unwrap();
        assert_eq!(from_cli.id, AttackId::new(2));
        assert_eq!(from_daemon.id, AttackId::new(3));

        let ids: Vec<AttackId> = daemon.get_all().iter().map(|e| e.id).collect();
        assert_eq!(ids, [AttackId::new(1), AttackId::new(2), AttackId::new(3)]);
        assert_eq!(cli.get_status().total_attacks(), 3);

        assert!(cli.reset());
        assert_eq!(daemon.next_id(), AttackId::FIRST);
        let after_reset = daemon
            .record_event(AttackKind::Deleted, Path::new("/t/a"), None, None)
            .unwrap();
        assert_eq!(after_reset.id, AttackId::FIRST);
    }

    #[test]
    fn test_trails_in_separate_threads_never_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let trails = [trail_in(dir.path()), trail_in(dir.path())];

        std::thread::scope(|scope| {
            for trail in &trails {
                scope.spawn(move || {
                    for _ in 0..8 {
                        trail
                            .record_event(AttackKind::Modified, Path::new("/t/a"), None, None)
                            .unwrap();
                    }
                });
            }
        });

        let mut ids: Vec<AttackId> = trails[0].get_all().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 16);
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(trails[1].get_status().total_attacks(), 16);
    }
}
