//! Mock implementations for testing.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use honeytrap_tokens::{TokenError, TokenResult, TokenStore};

/// Scripted answer for one `verify_and_recreate_missing` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Every protected file reports present.
    AllPresent,
    /// The named files report missing, everything else present.
    Missing(Vec<String>),
    /// The call fails with [`TokenError::Unavailable`].
    Unavailable(String),
}

/// A [`TokenStore`] whose answers are scripted and whose calls are counted.
///
/// Nothing is written to disk. Queued verify outcomes are consumed one per
/// call; once the queue is empty every call reports all files present.
#[derive(Debug)]
pub struct ScriptedTokenStore {
    root: PathBuf,
    paths: Mutex<Vec<PathBuf>>,
    verify_script: Mutex<VecDeque<VerifyOutcome>>,
    verify_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl ScriptedTokenStore {
    /// Create a store watching `root` and protecting `paths`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, paths: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths: Mutex::new(paths),
            verify_script: Mutex::new(VecDeque::new()),
            verify_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Queue the outcome of a future verify call.
    pub fn push_verify(&self, outcome: VerifyOutcome) {
        self.verify_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Replace the protected path list.
    pub fn set_paths(&self, paths: Vec<PathBuf>) {
        *self.paths.lock().unwrap_or_else(PoisonError::into_inner) = paths;
    }

    /// Number of verify calls so far.
    #[must_use]
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    /// Number of path list calls so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn names(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

impl TokenStore for ScriptedTokenStore {
    fn watch_root(&self) -> &Path {
        &self.root
    }

    fn list_protected_paths(&self) -> TokenResult<Vec<PathBuf>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn verify_and_recreate_missing(&self) -> TokenResult<BTreeMap<String, bool>> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .verify_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(VerifyOutcome::AllPresent);

        let mut report: BTreeMap<String, bool> =
            self.names().into_iter().map(|n| (n, true)).collect();
        match outcome {
            VerifyOutcome::AllPresent => {},
            VerifyOutcome::Missing(missing) => {
                for name in missing {
                    report.insert(name, false);
                }
            },
            VerifyOutcome::Unavailable(reason) => return Err(TokenError::Unavailable(reason)),
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_consumed_in_order() {
        let store = ScriptedTokenStore::new("/tok", vec![PathBuf::from("/tok/a.txt")]);
        store.push_verify(VerifyOutcome::Missing(vec!["a.txt".into()]));
        store.push_verify(VerifyOutcome::Unavailable("down".into()));

        let first = store.verify_and_recreate_missing().unwrap();
        assert_eq!(first.get("a.txt"), Some(&false));
        assert!(store.verify_and_recreate_missing().is_err());
        let third = store.verify_and_recreate_missing().unwrap();
        assert_eq!(third.get("a.txt"), Some(&true));
        assert_eq!(store.verify_calls(), 3);
    }

    #[test]
    fn test_paths_are_replaceable() {
        let store = ScriptedTokenStore::new("/tok", vec![PathBuf::from("/tok/a.txt")]);
        store.set_paths(Vec::new());
        assert!(store.list_protected_paths().unwrap().is_empty());
        assert_eq!(store.list_calls(), 1);
        assert_eq!(store.watch_root(), Path::new("/tok"));
    }
}
