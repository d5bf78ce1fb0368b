//! The token store interface and the on-disk decoy directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::decoys::{DecoySpec, default_decoys};
use crate::error::{TokenError, TokenResult};

/// Source of protected paths for the supervisor.
///
/// Both query operations are idempotent and safe to call repeatedly.
pub trait TokenStore: Send + Sync {
    /// Directory the supervisor attaches its watch to.
    fn watch_root(&self) -> &Path;

    /// Absolute paths of every protected file.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot enumerate its files.
    fn list_protected_paths(&self) -> TokenResult<Vec<PathBuf>>;

    /// Check every protected file, recreating missing ones.
    ///
    /// Returns file name → present after the recreation attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be inspected at all. Individual
    /// recreation failures show up as `false` entries instead.
    fn verify_and_recreate_missing(&self) -> TokenResult<BTreeMap<String, bool>>;
}

/// Metadata about one decoy on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// File name.
    pub filename: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: Option<DateTime<Utc>>,
}

/// A directory of decoy files.
#[derive(Debug, Clone)]
pub struct DecoyDirectory {
    root: PathBuf,
    decoys: Vec<DecoySpec>,
}

impl DecoyDirectory {
    /// Manage the default decoys in `root`. Relative roots are made absolute
    /// against the current directory; nothing is written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new(root: impl AsRef<Path>) -> TokenResult<Self> {
        Self::with_decoys(root, default_decoys())
    }

    /// Manage a custom decoy set in `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn with_decoys(root: impl AsRef<Path>, decoys: Vec<DecoySpec>) -> TokenResult<Self> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| TokenError::io(root, e))?;
        Ok(Self { root, decoys })
    }

    /// Number of managed decoys.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.decoys.len()
    }

    /// Names of the managed decoys, in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decoys.iter().map(|d| d.name.as_str())
    }

    /// Path of a managed decoy.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::UnknownToken`] if `name` is not managed here.
    pub fn path_of(&self, name: &str) -> TokenResult<PathBuf> {
        self.decoys
            .iter()
            .find(|d| d.name == name)
            .map(|d| self.root.join(&d.name))
            .ok_or_else(|| TokenError::UnknownToken(name.to_owned()))
    }

    /// Write every decoy, overwriting existing files.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub fn create_all(&self) -> TokenResult<usize> {
        self.ensure_root()?;
        for decoy in &self.decoys {
            self.write_decoy(decoy)?;
        }
        info!(
            count = self.decoys.len(),
            dir = %self.root.display(),
            "created honey-tokens"
        );
        Ok(self.decoys.len())
    }

    /// Write only the decoys that are missing. Returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create_missing(&self) -> TokenResult<usize> {
        self.ensure_root()?;
        let mut written = 0usize;
        for decoy in &self.decoys {
            if self.root.join(&decoy.name).exists() {
                continue;
            }
            match self.write_decoy(decoy) {
                Ok(()) => written = written.saturating_add(1),
                Err(e) => warn!(token = %decoy.name, error = %e, "failed to create honey-token"),
            }
        }
        Ok(written)
    }

    /// Describe the decoys currently on disk. Missing files are skipped.
    #[must_use]
    pub fn describe(&self) -> Vec<TokenInfo> {
        self.decoys
            .iter()
            .filter_map(|decoy| {
                let path = self.root.join(&decoy.name);
                let meta = std::fs::metadata(&path).ok()?;
                Some(TokenInfo {
                    filename: decoy.name.clone(),
                    size: meta.len(),
                    modified: meta.modified().ok().map(DateTime::<Utc>::from),
                    path,
                })
            })
            .collect()
    }

    /// Remove every decoy that exists. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns the first removal failure.
    pub fn cleanup(&self) -> TokenResult<usize> {
        let mut removed = 0usize;
        for decoy in &self.decoys {
            let path = self.root.join(&decoy.name);
            match std::fs::remove_file(&path) {
                Ok(()) => removed = removed.saturating_add(1),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
                Err(e) => return Err(TokenError::io(path, e)),
            }
        }
        info!(count = removed, "removed honey-tokens");
        Ok(removed)
    }

    fn ensure_root(&self) -> TokenResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| TokenError::io(&self.root, e))
    }

    fn write_decoy(&self, decoy: &DecoySpec) -> TokenResult<()> {
        let path = self.root.join(&decoy.name);
        std::fs::write(&path, &decoy.content).map_err(|e| TokenError::io(&path, e))?;
        set_decoy_permissions(&path)?;
        debug!(path = %path.display(), "wrote honey-token");
        Ok(())
    }
}

#[cfg(unix)]
fn set_decoy_permissions(path: &Path) -> TokenResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
        .map_err(|e| TokenError::io(path, e))
}

#[cfg(not(unix))]
fn set_decoy_permissions(_path: &Path) -> TokenResult<()> {
    Ok(())
}

impl TokenStore for DecoyDirectory {
    fn watch_root(&self) -> &Path {
        &self.root
    }

    fn list_protected_paths(&self) -> TokenResult<Vec<PathBuf>> {
        Ok(self.decoys.iter().map(|d| self.root.join(&d.name)).collect())
    }

    fn verify_and_recreate_missing(&self) -> TokenResult<BTreeMap<String, bool>> {
        let missing: Vec<&DecoySpec> = self
            .decoys
            .iter()
            .filter(|d| !self.root.join(&d.name).exists())
            .collect();

        if !missing.is_empty() {
            warn!(
                count = missing.len(),
                dir = %self.root.display(),
                "honey-tokens missing, recreating"
            );
            self.ensure_root()?;
            for decoy in &missing {
                if let Err(e) = self.write_decoy(decoy) {
                    warn!(token = %decoy.name, error = %e, "failed to recreate honey-token");
                }
            }
        }

        Ok(self
            .decoys
            .iter()
            .map(|d| (d.name.clone(), self.root.join(&d.name).exists()))
            .collect())
    }
}
