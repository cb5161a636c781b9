//! Scanner module - File discovery and reading
//!
//! [`Scanner::scan`] returns the deduplicated set of supported files below a
//! root. The set carries no ordering; callers that need a stable order sort it.

mod filesystem;
pub mod language;

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::ScanError;

pub use filesystem::WalkOptions;
pub use language::Language;

/// Main scanner for source discovery
#[derive(Debug, Clone)]
pub struct Scanner {
    extensions: HashSet<String>,
    walk: WalkOptions,
    backup_marker: String,
    exclude: Option<GlobSet>,
}

impl Scanner {
    /// Create a scanner from the `[scan]` configuration
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let exclude = if config.exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &config.exclude {
                let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|e| ScanError::InvalidPattern {
                pattern: config.exclude.join(", "),
                message: e.to_string(),
            })?)
        };

        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            walk: WalkOptions {
                ignore_dirs: config.ignore_dirs.iter().cloned().collect(),
                respect_gitignore: config.respect_gitignore,
            },
            backup_marker: config.backup_marker.clone(),
            exclude,
        })
    }

    /// Discover supported files below `root`.
    ///
    /// A root that is itself a supported, non-backup file yields just that file.
    /// The caller is responsible for checking that `root` exists.
    pub fn scan(&self, root: &Path) -> HashSet<PathBuf> {
        if root.is_file() {
            let mut files = HashSet::new();
            if self.accepts(root, root) {
                files.insert(root.to_path_buf());
            }
            return files;
        }

        let files: HashSet<PathBuf> = filesystem::walk_files(root, &self.walk)
            .into_iter()
            .filter(|path| self.accepts(root, path))
            .collect();

        debug!(root = %root.display(), files = files.len(), "Scan complete");
        files
    }

    /// Whether a discovered path belongs in the file set
    fn accepts(&self, root: &Path, path: &Path) -> bool {
        if !self.is_supported(path) || self.is_backup(path) {
            return false;
        }
        if filesystem::has_ignored_segment(root, path, &self.walk.ignore_dirs) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            let relative = path.strip_prefix(root).unwrap_or(path);
            if exclude.is_match(relative) {
                return false;
            }
        }
        true
    }

    /// Whether the extension is in the supported set
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }

    /// Whether the filename carries the backup marker
    pub fn is_backup(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(&self.backup_marker))
    }
}

/// A file read fresh from disk, ready for analysis
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path as discovered
    pub path: PathBuf,
    /// Language detected from the extension
    pub language: Language,
    /// Full UTF-8 content
    pub content: String,
}

impl FileRecord {
    /// Read a file, rejecting anything that is not valid UTF-8
    pub fn read(path: &Path) -> Result<Self, ScanError> {
        let bytes = fs::read(path).map_err(|e| ScanError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let content = String::from_utf8(bytes).map_err(|_| ScanError::InvalidEncoding {
            path: path.display().to_string(),
        })?;

        Ok(Self::from_content(path, content))
    }

    /// Build a record from content already in memory
    pub fn from_content(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            language: Language::from_path(&path),
            path,
            content: content.into(),
        }
    }
}
