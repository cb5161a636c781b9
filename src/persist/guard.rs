//! Persistence guard - Backup then atomic write

use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::DEFAULT_BACKUP_MARKER;
use crate::error::PersistError;
use crate::utils::permissions;

/// Writes repaired content back, keeping a copy of the original
#[derive(Debug, Clone)]
pub struct PersistenceGuard {
    marker: String,
}

impl Default for PersistenceGuard {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_MARKER)
    }
}

impl PersistenceGuard {
    /// Create a guard whose backups carry `marker` in their filename
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Whether `path` is itself a backup
    pub fn is_backup(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(&self.marker))
    }

    /// Back up `path`, then replace it with `content`
    ///
    /// Returns the backup path, or `None` when `path` is already a backup and
    /// was written without one.
    pub fn persist(&self, path: &Path, content: &str) -> Result<Option<PathBuf>, PersistError> {
        let backup = if self.is_backup(path) {
            None
        } else {
            Some(self.backup(path)?)
        };
        write_atomic(path, content.as_bytes())?;
        debug!(path = %path.display(), backup = ?backup, "Persisted file");
        Ok(backup)
    }

    /// Copy the current bytes of `path` to a fresh timestamped sibling
    pub fn backup(&self, path: &Path) -> Result<PathBuf, PersistError> {
        let target = self.backup_path(path);
        fs::copy(path, &target).map_err(|e| PersistError::Backup {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(target)
    }

    /// First unused `<stem><marker><timestamp>[_n]<.ext>` next to `path`
    fn backup_path(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let base = format!("{}{}{}", stem, self.marker, stamp);

        let mut candidate = path.with_file_name(format!("{}{}", base, ext));
        let mut n = 1;
        while candidate.exists() {
            candidate = path.with_file_name(format!("{}_{}{}", base, n, ext));
            n += 1;
        }
        candidate
    }
}

/// Temp file in the same directory, fsync, rename over the target
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), PersistError> {
    let write_err = |e: std::io::Error| PersistError::Write {
        path: path.display().to_string(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => {
            return Err(PersistError::NoParent {
                path: path.display().to_string(),
            })
        }
    };
    let original_permissions = permissions::capture(path).ok();

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(content).map_err(write_err)?;
    temp.flush().map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;

    if let Some(perms) = &original_permissions {
        permissions::restore(temp.path(), perms).map_err(write_err)?;
    }

    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
