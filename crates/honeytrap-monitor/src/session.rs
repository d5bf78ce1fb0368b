//! One live filesystem watch: a `notify` watcher feeding a tokio task that
//! classifies notifications and records attack events.
//!
//! ```text
//! notify callback thread
//!   → unbounded channel
//!   → session task: RawNotification → WatchSet::classify
//!   → AuditTrail::record_event (blocking pool)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use honeytrap_audit::AuditTrail;
use notify::event::{AccessKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::SupervisorResult;
use crate::watchset::{RawKind, RawNotification, WatchSet};

/// Cheap, cloneable view of a session's liveness and event count.
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionProbe {
    finished: Arc<AtomicBool>,
    events: Arc<AtomicU64>,
}

impl SessionProbe {
    /// Whether the session task is still running.
    pub(crate) fn is_alive(&self) -> bool {
        !self.finished.load(Ordering::Acquire)
    }

    /// Protected-file notifications seen by this session.
    pub(crate) fn event_count(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }
}

/// Marks the probe finished however the task ends, abort included.
struct FinishGuard(Arc<AtomicBool>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// A running watch session.
pub(crate) struct WatchSession {
    watcher: RecommendedWatcher,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    probe: SessionProbe,
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("alive", &self.probe.is_alive())
            .field("events", &self.probe.event_count())
            .finish_non_exhaustive()
    }
}

impl WatchSession {
    /// Attach a non-recursive watch to `root` and spawn the session task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Watch`](crate::SupervisorError::Watch) if
    /// the watcher cannot be created or attached.
    pub(crate) fn spawn(root: &Path, set: WatchSet, audit: Arc<AuditTrail>) -> SupervisorResult<Self> {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = raw_tx.send(res);
            },
            notify::Config::default(),
        )?;
        watcher.watch(root, RecursiveMode::NonRecursive)?;

        let cancel = CancellationToken::new();
        let probe = SessionProbe::default();
        let task = tokio::spawn(run(
            root.to_path_buf(),
            set,
            audit,
            raw_rx,
            cancel.clone(),
            probe.clone(),
        ));

        Ok(Self {
            watcher,
            cancel,
            task,
            probe,
        })
    }

    pub(crate) fn probe(&self) -> SessionProbe {
        self.probe.clone()
    }

    /// Stop the session, waiting up to `grace` for the task before aborting
    /// it. Never fails; teardown problems are logged.
    pub(crate) async fn shutdown(self, grace: Duration) {
        let Self {
            watcher,
            cancel,
            mut task,
            probe: _,
        } = self;

        cancel.cancel();
        drop(watcher);

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => debug!("watch session stopped"),
            Ok(Err(e)) if e.is_cancelled() => debug!("watch session was already aborted"),
            Ok(Err(e)) => warn!(error = %e, "watch session task failed"),
            Err(_) => {
                warn!(
                    grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                    "watch session did not stop in time, forcing shutdown"
                );
                task.abort();
            },
        }
    }

    /// Kill the session task without detaching the watcher, as if it had
    /// crashed.
    #[cfg(any(test, feature = "test-support"))]
    pub(crate) fn abort(&self) {
        self.task.abort();
    }
}

async fn run(
    root: PathBuf,
    set: WatchSet,
    audit: Arc<AuditTrail>,
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    cancel: CancellationToken,
    probe: SessionProbe,
) {
    let _guard = FinishGuard(Arc::clone(&probe.finished));
    info!(root = %root.display(), files = set.len(), "watch session started");

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            msg = raw_rx.recv() => match msg {
                Some(Ok(event)) => {
                    if root_removed(&root, &event) {
                        error!(root = %root.display(), "watch directory removed, watch session ending");
                        break;
                    }
                    for note in notifications(&event) {
                        for (kind, path) in set.classify(&note) {
                            probe.events.fetch_add(1, Ordering::Relaxed);
                            record(&audit, kind, path).await;
                        }
                    }
                },
                Some(Err(e)) => warn!(error = %e, "filesystem watch error"),
                None => {
                    debug!("watch channel closed");
                    break;
                },
            },
        }
    }

    info!(root = %root.display(), "watch session ended");
}

async fn record(audit: &Arc<AuditTrail>, kind: honeytrap_audit::AttackKind, path: PathBuf) {
    let audit = Arc::clone(audit);
    let path_str = path.display().to_string();
    let outcome =
        tokio::task::spawn_blocking(move || audit.record_event(kind, &path, None, None)).await;

    match outcome {
        Ok(Ok(event)) => warn!(
            attack_id = %event.id,
            kind = %event.kind,
            file = %event.target_name,
            process = %event.actor.process_name,
            pid = %event.actor.display_pid(),
            user = %event.actor.username,
            "honey-token accessed"
        ),
        Ok(Err(e)) => error!(path = %path_str, error = %e, "failed to record attack event"),
        Err(e) => error!(path = %path_str, error = %e, "attack recording task failed"),
    }
}

fn root_removed(root: &Path, event: &Event) -> bool {
    matches!(event.kind, EventKind::Remove(_)) && event.paths.iter().any(|p| p == root)
}

/// Translate a `notify` event into raw notifications.
///
/// Close events carry no new information after the open/modify that
/// preceded them and are dropped, as are creations. `Name(Both)` is dropped
/// because backends that can pair renames also report each half on its own.
pub(crate) fn notifications(event: &Event) -> Vec<RawNotification> {
    let (kind, folder) = match event.kind {
        EventKind::Access(AccessKind::Close(_)) => return Vec::new(),
        EventKind::Access(_) => (RawKind::Access, false),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => (RawKind::RenameFrom, false),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => (RawKind::RenameTo, false),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => return Vec::new(),
        EventKind::Modify(ModifyKind::Name(_)) => (RawKind::Rename, false),
        EventKind::Modify(_) => (RawKind::Modify, false),
        EventKind::Remove(RemoveKind::Folder) => (RawKind::Remove, true),
        EventKind::Remove(_) => (RawKind::Remove, false),
        EventKind::Create(_) | EventKind::Any | EventKind::Other => return Vec::new(),
    };

    event
        .paths
        .iter()
        .map(|path| RawNotification {
            kind,
            is_directory: folder || path.is_dir(),
            src: path.clone(),
            dest: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessMode, CreateKind, DataChange};

    use super::*;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_notification_mapping() {
        let cases = [
            (EventKind::Access(AccessKind::Read), Some(RawKind::Access)),
            (
                EventKind::Access(AccessKind::Open(AccessMode::Any)),
                Some(RawKind::Access),
            ),
            (EventKind::Access(AccessKind::Close(AccessMode::Write)), None),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                Some(RawKind::Modify),
            ),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::From)),
                Some(RawKind::RenameFrom),
            ),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::To)),
                Some(RawKind::RenameTo),
            ),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
                Some(RawKind::Rename),
            ),
            (EventKind::Remove(RemoveKind::File), Some(RawKind::Remove)),
            (EventKind::Create(CreateKind::File), None),
        ];

        for (kind, expected) in cases {
            let notes = notifications(&event(kind, "/tok/passwords.txt"));
            assert_eq!(notes.first().map(|n| n.kind), expected, "{kind:?}");
        }
    }

    #[test]
    fn test_paired_rename_is_dropped() {
        let ev = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/tok/a"))
            .add_path(PathBuf::from("/tok/b"));
        assert!(notifications(&ev).is_empty());
    }

    #[test]
    fn test_folder_removal_is_directory() {
        let notes = notifications(&event(EventKind::Remove(RemoveKind::Folder), "/tok/sub"));
        assert!(notes[0].is_directory);
    }

    #[test]
    fn test_root_removed() {
        let root = Path::new("/tok");
        assert!(root_removed(root, &event(EventKind::Remove(RemoveKind::Any), "/tok")));
        assert!(!root_removed(
            root,
            &event(EventKind::Remove(RemoveKind::File), "/tok/a")
        ));
        assert!(!root_removed(root, &event(EventKind::Access(AccessKind::Read), "/tok")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_session_records_writes_and_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let decoy = dir.path().join("passwords.txt");
        std::fs::write(&decoy, "admin:hunter2").unwrap();

        let audit = Arc::new(AuditTrail::in_memory().unwrap());
        let session =
            WatchSession::spawn(dir.path(), WatchSet::new([&decoy]), Arc::clone(&audit)).unwrap();
        let probe = session.probe();
        assert!(probe.is_alive());

        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(&decoy, "changed").unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), "noise").unwrap();

        let mut recorded = Vec::new();
        for _ in 0..100 {
            recorded = audit.get_all();
            if !recorded.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!recorded.is_empty(), "no event recorded");
        assert!(recorded.iter().all(|e| e.target_name == "passwords.txt"));
        assert!(probe.event_count() >= 1);

        session.shutdown(Duration::from_secs(2)).await;
        assert!(!probe.is_alive());
    }

    #[tokio::test]
    async fn test_abort_marks_probe_dead() {
        let dir = tempfile::tempdir().unwrap();
        let audit = Arc::new(AuditTrail::in_memory().unwrap());
        let session = WatchSession::spawn(dir.path(), WatchSet::new([dir.path().join("x")]), audit)
            .unwrap();
        let probe = session.probe();

        session.abort();
        for _ in 0..50 {
            if !probe.is_alive() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!probe.is_alive());
        session.shutdown(Duration::from_millis(100)).await;
    }

    #[tokio::test]
    async fn test_spawn_fails_on_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let audit = Arc::new(AuditTrail::in_memory().unwrap());

        let err = WatchSession::spawn(&missing, WatchSet::new([missing.join("a")]), audit)
            .unwrap_err();
        assert!(matches!(err, crate::SupervisorError::Watch(_)));
    }
}
