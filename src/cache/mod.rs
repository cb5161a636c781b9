//! Analysis results caching module
//!
//! This module provides a cache of detector output so unchanged files are not
//! re-analysed. A file counts as unchanged when its modification time and size
//! match the recorded ones.
//!
//! The cache is never consulted implicitly: callers pass it to
//! [`crate::pipeline::Pipeline::run`], and a forced rescan simply passes none.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::FixLensError;
use crate::rules::results::Issue;

/// Default cache directory name within the project
const DEFAULT_CACHE_DIR: &str = ".fixlens/cache";

/// Default maximum age for cache entries in hours
const DEFAULT_MAX_AGE_HOURS: u64 = 24;

/// Cache file name
const CACHE_FILE_NAME: &str = "analysis_cache.json";

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// Identity of a file's content as seen by the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStamp {
    /// Modification time, nanoseconds since UNIX epoch
    pub mtime_nanos: u64,
    /// Size in bytes
    pub size: u64,
}

impl FileStamp {
    /// Read the stamp of a file on disk
    pub fn of(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let mtime_nanos = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos() as u64;
        Ok(Self {
            mtime_nanos,
            size: metadata.len(),
        })
    }
}

/// A single cache entry for a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Path to the file relative to the scan root
    pub file_path: String,

    /// Stamp of the file when it was analysed
    pub stamp: FileStamp,

    /// Detector output for this file, before any kind filter
    pub issues: Vec<Issue>,

    /// Timestamp when the entry was created (seconds since UNIX epoch)
    pub timestamp: u64,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(file_path: String, stamp: FileStamp, issues: Vec<Issue>) -> Self {
        Self {
            file_path,
            stamp,
            issues,
            timestamp: now_secs(),
        }
    }

    /// Check if the entry is expired based on max age
    pub fn is_expired(&self, max_age_hours: u64) -> bool {
        let max_age_secs = max_age_hours * 3600;
        now_secs().saturating_sub(self.timestamp) > max_age_secs
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum age for cache entries in hours
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,

    /// Cache directory path (relative to project root or absolute)
    #[serde(default = "default_directory")]
    pub directory: String,
}

fn default_enabled() -> bool {
    true
}

fn default_max_age_hours() -> u64 {
    DEFAULT_MAX_AGE_HOURS
}

fn default_directory() -> String {
    DEFAULT_CACHE_DIR.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
            directory: DEFAULT_CACHE_DIR.to_string(),
        }
    }
}

/// Detector output keyed by relative path
#[derive(Debug)]
pub struct AnalysisCache {
    /// Cache entries indexed by relative file path
    entries: HashMap<PathBuf, CacheEntry>,

    /// Path to the cache directory
    cache_dir: PathBuf,

    /// Cache configuration
    config: CacheConfig,

    /// Whether the cache has been modified since loading
    dirty: bool,
}

impl AnalysisCache {
    /// Create an empty cache rooted at `project_root`
    pub fn new(project_root: &Path, config: CacheConfig) -> Self {
        let cache_dir = Self::resolve_cache_dir(project_root, &config.directory);

        Self {
            entries: HashMap::new(),
            cache_dir,
            config,
            dirty: false,
        }
    }

    /// Resolve the cache directory path
    fn resolve_cache_dir(project_root: &Path, directory: &str) -> PathBuf {
        let path = Path::new(directory);

        if path.is_absolute() {
            path.to_path_buf()
        } else if directory.starts_with('~') {
            // Handle home directory expansion
            match dirs::home_dir() {
                Some(home) => home.join(directory.trim_start_matches("~/")),
                None => project_root.join(directory),
            }
        } else {
            project_root.join(directory)
        }
    }

    /// Load cache from disk
    ///
    /// A missing or unreadable cache file yields an empty cache; expired
    /// entries are dropped while loading.
    pub fn load(project_root: &Path, config: CacheConfig) -> Self {
        let cache_dir = Self::resolve_cache_dir(project_root, &config.directory);
        let cache_file = cache_dir.join(CACHE_FILE_NAME);

        let entries = match fs::read_to_string(&cache_file) {
            Ok(content) => match serde_json::from_str::<Vec<CacheEntry>>(&content) {
                Ok(entries) => {
                    let map: HashMap<PathBuf, CacheEntry> = entries
                        .into_iter()
                        .filter(|e| !e.is_expired(config.max_age_hours))
                        .map(|e| (PathBuf::from(&e.file_path), e))
                        .collect();
                    tracing::debug!(
                        "Loaded {} cache entries from {}",
                        map.len(),
                        cache_file.display()
                    );
                    map
                }
                Err(e) => {
                    tracing::warn!("Failed to parse cache file: {}", e);
                    HashMap::new()
                }
            },
            Err(e) => {
                tracing::debug!("No usable cache file at {}: {}", cache_file.display(), e);
                HashMap::new()
            }
        };

        Self {
            entries,
            cache_dir,
            config,
            dirty: false,
        }
    }

    /// Save cache to disk when it changed
    pub fn save(&self) -> Result<(), FixLensError> {
        if !self.dirty {
            tracing::debug!("Cache not modified, skipping save");
            return Ok(());
        }

        fs::create_dir_all(&self.cache_dir).map_err(|e| FixLensError::Output {
            path: self.cache_dir.display().to_string(),
            source: e,
        })?;

        let cache_file = self.cache_dir.join(CACHE_FILE_NAME);
        let entries: Vec<&CacheEntry> = self.entries.values().collect();
        let content = serde_json::to_string_pretty(&entries)?;

        fs::write(&cache_file, content).map_err(|e| FixLensError::Output {
            path: cache_file.display().to_string(),
            source: e,
        })?;

        tracing::debug!(
            "Saved {} cache entries to {}",
            entries.len(),
            cache_file.display()
        );

        Ok(())
    }

    /// Cached issues for a file if its stamp still matches
    pub fn get(&self, file_path: &Path, stamp: &FileStamp) -> Option<&[Issue]> {
        self.entries.get(file_path).and_then(|entry| {
            if entry.stamp == *stamp && !entry.is_expired(self.config.max_age_hours) {
                tracing::trace!("Cache hit for {}", file_path.display());
                Some(entry.issues.as_slice())
            } else {
                tracing::trace!("Cache miss for {} (stamp or expiry)", file_path.display());
                None
            }
        })
    }

    /// Insert or update a cache entry
    pub fn insert(&mut self, file_path: PathBuf, stamp: FileStamp, issues: Vec<Issue>) {
        let entry = CacheEntry::new(file_path.to_string_lossy().into_owned(), stamp, issues);
        self.entries.insert(file_path, entry);
        self.dirty = true;
    }

    /// Drop the entry of a file whose content changed
    pub fn invalidate(&mut self, file_path: &Path) {
        if self.entries.remove(file_path).is_some() {
            self.dirty = true;
            tracing::debug!("Invalidated cache for {}", file_path.display());
        }
    }

    /// Get the number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directory the cache file lives in
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::results::IssueKind;
    use tempfile::TempDir;

    fn stamp(size: u64) -> FileStamp {
        FileStamp {
            mtime_nanos: 1_700_000_000_000_000_000,
            size,
        }
    }

    fn issue() -> Issue {
        Issue::new(IssueKind::BareExcept, "Bare except clause - specify exception type", 3)
    }

    #[test]
    fn test_cache_entry_expiry() {
        let mut entry = CacheEntry::new("a.py".to_string(), stamp(1), vec![]);
        assert!(!entry.is_expired(24));

        entry.timestamp = now_secs() - (25 * 3600);
        assert!(entry.is_expired(24));
        assert!(!entry.is_expired(48));
    }

    #[test]
    fn test_file_stamp_tracks_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.py");
        fs::write(&path, "x = 1\n").unwrap();
        let first = FileStamp::of(&path).unwrap();
        assert_eq!(first.size, 6);

        fs::write(&path, "x = 10\n").unwrap();
        let second = FileStamp::of(&path).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_insert_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = AnalysisCache::new(temp_dir.path(), CacheConfig::default());

        cache.insert(PathBuf::from("a.py"), stamp(10), vec![issue()]);

        assert_eq!(cache.get(Path::new("a.py"), &stamp(10)).unwrap().len(), 1);
        assert!(cache.get(Path::new("a.py"), &stamp(11)).is_none());
        assert!(cache.get(Path::new("b.py"), &stamp(10)).is_none());
    }

    #[test]
    fn test_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = AnalysisCache::new(temp_dir.path(), CacheConfig::default());

        cache.insert(PathBuf::from("a.py"), stamp(1), vec![]);
        cache.invalidate(Path::new("a.py"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config = CacheConfig::default();

        let mut cache = AnalysisCache::new(temp_dir.path(), config.clone());
        cache.insert(PathBuf::from("src/a.py"), stamp(10), vec![issue()]);
        cache.save().unwrap();

        assert!(temp_dir
            .path()
            .join(".fixlens/cache/analysis_cache.json")
            .exists());

        let loaded = AnalysisCache::load(temp_dir.path(), config);
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded.get(Path::new("src/a.py"), &stamp(10)).unwrap(),
            &[issue()]
        );
    }

    #[test]
    fn test_clean_cache_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let cache = AnalysisCache::new(temp_dir.path(), CacheConfig::default());
        cache.save().unwrap();
        assert!(!temp_dir.path().join(".fixlens").exists());
    }

    #[test]
    fn test_corrupt_cache_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(".fixlens/cache");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CACHE_FILE_NAME), "not json").unwrap();

        let cache = AnalysisCache::load(temp_dir.path(), CacheConfig::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_config_defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_age_hours, 24);
        assert_eq!(config.directory, ".fixlens/cache");
    }
}
