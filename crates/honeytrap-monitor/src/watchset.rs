//! Protected path set and notification classifier.
//!
//! Both the protected paths and every notification path are canonicalized
//! before comparison, so `tokens/../tokens/passwords.txt` and a symlink to
//! the decoy match the same member. Paths that no longer exist (a deleted
//! decoy, the source of a rename) are resolved through their parent
//! directory instead.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use honeytrap_audit::AttackKind;

/// What the filesystem reported, before membership filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    /// Open or read.
    Access,
    /// Data or metadata write.
    Modify,
    /// Unlink.
    Remove,
    /// Rename, `src` is the old name.
    RenameFrom,
    /// Rename, `src` is the new name.
    RenameTo,
    /// Rename carrying both endpoints when `dest` is set, otherwise an
    /// endpoint the backend could not tell apart.
    Rename,
}

/// A single notification as delivered by the watch backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    /// Kind of change.
    pub kind: RawKind,
    /// Whether the notification concerns a directory.
    pub is_directory: bool,
    /// Path the notification is about.
    pub src: PathBuf,
    /// Rename destination, when known.
    pub dest: Option<PathBuf>,
}

impl RawNotification {
    /// A notification about a regular file with no destination.
    #[must_use]
    pub fn file(kind: RawKind, src: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            is_directory: false,
            src: src.into(),
            dest: None,
        }
    }

    /// A rename of a regular file with both endpoints known.
    #[must_use]
    pub fn rename(src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            kind: RawKind::Rename,
            is_directory: false,
            src: src.into(),
            dest: Some(dest.into()),
        }
    }
}

/// Canonicalized set of protected files for one watch session.
#[derive(Debug, Clone)]
pub struct WatchSet {
    members: HashSet<PathBuf>,
}

impl WatchSet {
    /// Build the set from the token store's path list.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            members: paths
                .into_iter()
                .map(|p| canonicalize_lenient(p.as_ref()))
                .collect(),
        }
    }

    /// Number of protected files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `path` names a protected file.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.members.contains(&canonicalize_lenient(path))
    }

    /// Turn a notification into zero or more attack events.
    ///
    /// Directory notifications never match. A rename with both endpoints is
    /// split into `moved_from` and `moved_to` for whichever side is
    /// protected. Nothing is deduplicated here.
    #[must_use]
    pub fn classify(&self, note: &RawNotification) -> Vec<(AttackKind, PathBuf)> {
        if note.is_directory {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut emit = |kind: AttackKind, path: &Path| {
            if self.contains(path) {
                out.push((kind, path.to_path_buf()));
            }
        };

        match (note.kind, note.dest.as_deref()) {
            (RawKind::Access, _) => emit(AttackKind::Accessed, note.src.as_path()),
            (RawKind::Modify, _) => emit(AttackKind::Modified, note.src.as_path()),
            (RawKind::Remove, _) => emit(AttackKind::Deleted, note.src.as_path()),
            (RawKind::RenameFrom, _) => emit(AttackKind::MovedFrom, note.src.as_path()),
            (RawKind::RenameTo, _) => emit(AttackKind::MovedTo, note.src.as_path()),
            (RawKind::Rename, Some(dest)) => {
                emit(AttackKind::MovedFrom, note.src.as_path());
                emit(AttackKind::MovedTo, dest);
            },
            (RawKind::Rename, None) => emit(AttackKind::Moved, note.src.as_path()),
        }
        out
    }
}

/// Resolve `path` to an absolute, symlink-free form.
///
/// Falls back to the canonical parent joined with the file name when the
/// path itself is gone, and to a purely lexical absolute path when even the
/// parent cannot be resolved.
pub(crate) fn canonicalize_lenient(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(parent) = std::fs::canonicalize(parent) {
            return parent.join(name);
        }
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
