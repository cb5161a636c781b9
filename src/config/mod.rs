//! Configuration module

pub mod loader;
pub mod presets;

pub use loader::Config;
pub use presets::Preset;

use serde::{Deserialize, Serialize};

/// Default extensions picked up by the scanner
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "html", "htm", "css", "scss", "sass", "java", "cpp", "c",
    "h", "php", "rb", "go", "rs", "json", "xml", "yaml", "yml",
];

/// Directory names never descended into
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    "venv",
    "env",
    ".venv",
    "dist",
    "build",
    ".fixlens",
];

/// Filename substring identifying a pre-fix snapshot
pub const DEFAULT_BACKUP_MARKER: &str = ".backup_";

/// Default ceiling on files processed per run
pub const DEFAULT_MAX_FILES: usize = 50;

/// Rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether the rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions (without the dot) that are scanned
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names that are skipped wherever they appear
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Extra glob patterns, relative to the scan root, to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Filename substring marking backup files
    #[serde(default = "default_backup_marker")]
    pub backup_marker: String,

    /// Honour .gitignore files while walking
    #[serde(default)]
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_dirs: default_ignore_dirs(),
            exclude: Vec::new(),
            backup_marker: default_backup_marker(),
            respect_gitignore: false,
        }
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_ignore_dirs() -> Vec<String> {
    DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect()
}

fn default_backup_marker() -> String {
    DEFAULT_BACKUP_MARKER.to_string()
}

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Enable predicates that read a bounded window around the line
    #[serde(default = "default_true")]
    pub deep_heuristics: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deep_heuristics: true,
        }
    }
}

/// Patch validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Minimum candidate length as a fraction of the original
    #[serde(default = "default_min_length_ratio")]
    pub min_length_ratio: f64,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            min_length_ratio: default_min_length_ratio(),
        }
    }
}

fn default_min_length_ratio() -> f64 {
    0.2
}

/// Run limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum number of files processed per run (0 disables the ceiling)
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Concurrent file workers (0 uses the available parallelism)
    #[serde(default)]
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            workers: 0,
        }
    }
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

impl RunConfig {
    /// Number of workers to actually start
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

/// Rewrite collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    /// Whether context-heavy issues are routed to the collaborator
    #[serde(default)]
    pub enabled: bool,

    /// Backend: auto, groq or openai
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model override
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL override for OpenAI-compatible endpoints
    #[serde(default)]
    pub base_url: Option<String>,

    /// Seconds before a rewrite is abandoned
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum characters offered to the collaborator
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Maximum issues offered to the collaborator
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_chars: default_max_chars(),
            max_issues: default_max_issues(),
        }
    }
}

fn default_provider() -> String {
    "auto".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_chars() -> usize {
    4000
}

fn default_max_issues() -> usize {
    10
}
