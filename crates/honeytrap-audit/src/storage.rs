//! Event store trait and its JSON-file and in-memory implementations.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{AuditError, AuditResult};
use crate::event::AttackEvent;
use crate::status::StatusRecord;

/// File holding the event array.
pub const EVENTS_FILE: &str = "attacks.json";

/// File holding the status record.
pub const STATUS_FILE: &str = "system_status.json";

/// Lock file serializing writers across processes.
pub const LOCK_FILE: &str = ".audit.lock";

/// Exclusive hold on a store, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "failed to release audit store lock");
        }
    }
}

/// Storage backend for the audit trail.
///
/// Implementations hold an ordered event collection and a single status
/// record, each independently reloadable. They do not serialize writers;
/// [`AuditTrail`](crate::AuditTrail) does.
pub trait EventStore: Send + Sync {
    /// Load every event in storage order. An absent collection is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Corrupt`] if the collection exists but cannot be
    /// decoded, or another error if it cannot be read.
    fn load_events(&self) -> AuditResult<Vec<AttackEvent>>;

    /// Replace the event collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    fn save_events(&self, events: &[AttackEvent]) -> AuditResult<()>;

    /// Load the status record, `None` when none was ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read or decoded.
    fn load_status(&self) -> AuditResult<Option<StatusRecord>>;

    /// Replace the status record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    fn save_status(&self, status: &StatusRecord) -> AuditResult<()>;

    /// Remove every event.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be cleared.
    fn clear_events(&self) -> AuditResult<()> {
        self.save_events(&[])
    }

    /// Exclude writers in other processes until the returned guard drops.
    /// Stores that cannot be shared return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    fn lock(&self) -> AuditResult<Option<StoreLock>> {
        Ok(None)
    }
}

/// JSON files in one directory: [`EVENTS_FILE`] and [`STATUS_FILE`].
///
/// Every write goes to a temporary file in the same directory which is
/// synced and renamed over the target, so readers see either the old or the
/// new contents.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the store directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> AuditResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the event file.
    #[must_use]
    pub fn events_path(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }

    /// Path of the status file.
    #[must_use]
    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    /// Path of the cross-process lock file.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AuditResult<Option<T>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "audit file not found");
                return Ok(None);
            },
            Err(e) => return Err(AuditError::Io(e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AuditError::Corrupt {
                location: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, path: &Path, value: &T) -> AuditResult<()> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| AuditError::SerializationError(e.to_string()))?;

        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| AuditError::Io(e.error))?;
        Ok(())
    }
}

impl EventStore for JsonFileStore {
    fn load_events(&self) -> AuditResult<Vec<AttackEvent>> {
        Ok(Self::read_json(&self.events_path())?.unwrap_or_default())
    }

    fn save_events(&self, events: &[AttackEvent]) -> AuditResult<()> {
        self.write_json(&self.events_path(), events)
    }

    fn load_status(&self) -> AuditResult<Option<StatusRecord>> {
        Self::read_json(&self.status_path())
    }

    fn save_status(&self, status: &StatusRecord) -> AuditResult<()> {
        self.write_json(&self.status_path(), status)
    }

    fn lock(&self) -> AuditResult<Option<StoreLock>> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .read(true)
            .open(self.lock_path())
            .map_err(|e| AuditError::StorageError(format!("failed to open lock file: {e}")))?;

        file.lock_exclusive().map_err(|e| {
            AuditError::StorageError(format!("failed to acquire exclusive file lock: {e}"))
        })?;

        Ok(Some(StoreLock { file }))
    }
}

/// Volatile store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<AttackEvent>>,
    status: Mutex<Option<StatusRecord>>,
}

impl MemoryEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for MemoryEventStore {
    fn load_events(&self) -> AuditResult<Vec<AttackEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_events(&self, events: &[AttackEvent]) -> AuditResult<()> {
        *self.events.lock().unwrap_or_else(PoisonError::into_inner) = events.to_vec();
        Ok(())
    }

    fn load_status(&self) -> AuditResult<Option<StatusRecord>> {
        Ok(self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_status(&self, status: &StatusRecord) -> AuditResult<()> {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = Some(status.clone());
        Ok(())
    }
}
