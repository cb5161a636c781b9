//! Error types for fixlens
//!
//! This module defines custom error types using `thiserror` for better error handling
//! and more descriptive error messages throughout the application.
//!
//! Per-file faults never surface through these types to the caller of a run: the
//! pipeline converts them into recorded issues. Only a missing root, a broken
//! configuration or a failing worker pool end a run early.

use thiserror::Error;

/// Main error type for fixlens
#[derive(Error, Debug)]
pub enum FixLensError {
    /// Scan-related errors
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Backup or write errors
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    /// Rewrite collaborator errors
    #[error("Rewrite collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to write a report or cache file
    #[error("Failed to write '{path}': {source}")]
    Output {
        /// Path that could not be written
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The worker pool could not run a task to completion
    #[error("Worker pool failure: {0}")]
    WorkerPool(String),
}

/// Errors that occur during file discovery and reading
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist
    #[error("Scan root '{path}' does not exist")]
    RootNotFound {
        /// The missing root
        path: String,
    },

    /// Failed to read a file
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The file is not valid UTF-8
    #[error("File '{path}' is not valid UTF-8")]
    InvalidEncoding {
        /// Path to the file
        path: String,
    },

    /// An exclude glob could not be compiled
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser message
        message: String,
    },
}

/// Errors that occur while loading or writing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        /// Path to the configuration file
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("Failed to serialize config: {message}")]
    Serialize {
        /// Serializer message
        message: String,
    },

    /// Unknown preset name
    #[error("Unknown preset '{name}'")]
    InvalidPreset {
        /// The requested preset
        name: String,
    },
}

/// A detector fault other than a recognised syntax failure
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The grammar could not be loaded into the parser
    #[error("Failed to load {language} grammar: {message}")]
    Grammar {
        /// Language whose grammar failed
        language: &'static str,
        /// Loader message
        message: String,
    },

    /// The parser returned no tree
    #[error("Parser produced no tree for {language} source")]
    NoTree {
        /// Language being parsed
        language: &'static str,
    },
}

/// Errors raised while backing up or writing a file
#[derive(Error, Debug)]
pub enum PersistError {
    /// The backup copy could not be created
    #[error("Failed to back up '{path}': {source}")]
    Backup {
        /// File being backed up
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The atomic write failed
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// File being written
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Target has no parent directory to stage a temp file in
    #[error("Path '{path}' has no parent directory")]
    NoParent {
        /// The offending path
        path: String,
    },
}

/// Errors reported by the rewrite collaborator
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// The collaborator did not answer within the configured timeout
    #[error("Rewrite timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed
        seconds: u64,
    },

    /// The input exceeds what the collaborator may be offered
    #[error("Input of {chars} characters exceeds the {max} character budget")]
    OverBudget {
        /// Size of the candidate
        chars: usize,
        /// Configured ceiling
        max: usize,
    },

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The endpoint answered without usable content
    #[error("Empty rewrite response")]
    EmptyResponse,
}

impl From<toml::de::Error> for FixLensError {
    fn from(err: toml::de::Error) -> Self {
        FixLensError::Config(ConfigError::Parse(err))
    }
}

impl From<toml::ser::Error> for FixLensError {
    fn from(err: toml::ser::Error) -> Self {
        FixLensError::Config(ConfigError::Serialize {
            message: err.to_string(),
        })
    }
}

// Allow conversion from std::io::Error for convenience
impl From<std::io::Error> for FixLensError {
    fn from(err: std::io::Error) -> Self {
        FixLensError::Scan(ScanError::FileRead {
            path: "unknown".to_string(),
            source: err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_display() {
        let err = FixLensError::from(ScanError::RootNotFound {
            path: "/missing".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Scan error: Scan root '/missing' does not exist"
        );
    }

    #[test]
    fn test_toml_error_converts_to_config_error() {
        let parse: Result<toml::Value, _> = toml::from_str("preset = ");
        let err: FixLensError = parse.unwrap_err().into();
        assert!(matches!(err, FixLensError::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn test_timeout_display() {
        let err = CollaboratorError::Timeout { seconds: 30 };
        assert_eq!(err.to_string(), "Rewrite timed out after 30s");
    }
}
