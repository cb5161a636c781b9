//! # Issue Structures
//!
//! This module defines the data structures for representing detected defects.
//!
//! ## Overview
//!
//! - [`Severity`] - Issue severity levels (Critical, Warning, Info)
//! - [`IssueKind`] - The closed taxonomy of defects the detector knows about
//! - [`Issue`] - A single detected defect with its 1-based line
//!
//! ## Examples
//!
//! ```rust
//! use fixlens::rules::{Issue, IssueKind, Severity};
//!
//! let issue = Issue::new(IssueKind::ComparisonBug, "Use 'is None' instead of '== None'", 3);
//!
//! assert_eq!(issue.kind.severity(), Severity::Warning);
//! assert!(!issue.is_file_level());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity levels for issues.
///
/// - **Critical** - Must be resolved (e.g., dynamic code execution, unparseable file)
/// - **Warning** - Likely bug or unsafe construct
/// - **Info** - Style or maintainability suggestion
///
/// # Examples
///
/// ```rust
/// use fixlens::rules::Severity;
///
/// let parsed = Severity::from_string("warning");
/// assert_eq!(parsed, Some(Severity::Warning));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Critical issues that must be resolved.
    Critical,
    /// Warnings that should be addressed.
    Warning,
    /// Informational suggestions.
    Info,
}

impl Severity {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" | "error" => Some(Self::Critical),
            "warning" | "warn" => Some(Self::Warning),
            "info" | "information" | "note" => Some(Self::Info),
            _ => None,
        }
    }
}

/// Closed taxonomy of detectable defects.
///
/// The variant name is the stable identifier used in configuration
/// (`[rules.ComparisonBug]`), on the command line (`--only ComparisonBug`)
/// and in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum IssueKind {
    SecurityIssue,
    ComparisonBug,
    BareExcept,
    MutableDefault,
    TypeCheckBug,
    ImportIssue,
    ResourceLeak,
    DatabaseIssue,
    APIIssue,
    ErrorHandling,
    EmptyFunction,
    DuplicateException,
    PerformanceIssue,
    StyleIssue,
    Accessibility,
    DeprecatedCode,
    CodeQuality,
    AssignmentInCondition,
    SyntaxError,
    FileError,
    AnalysisError,
    /// Function body too long for line-local rules
    LongFunction,
    /// Module without structured logging
    MissingLogging,
    /// Module defining functions without any error handling
    MissingErrorHandling,
}

impl IssueKind {
    /// Every kind, in taxonomy order
    pub const ALL: [IssueKind; 24] = [
        Self::SecurityIssue,
        Self::ComparisonBug,
        Self::BareExcept,
        Self::MutableDefault,
        Self::TypeCheckBug,
        Self::ImportIssue,
        Self::ResourceLeak,
        Self::DatabaseIssue,
        Self::APIIssue,
        Self::ErrorHandling,
        Self::EmptyFunction,
        Self::DuplicateException,
        Self::PerformanceIssue,
        Self::StyleIssue,
        Self::Accessibility,
        Self::DeprecatedCode,
        Self::CodeQuality,
        Self::AssignmentInCondition,
        Self::SyntaxError,
        Self::FileError,
        Self::AnalysisError,
        Self::LongFunction,
        Self::MissingLogging,
        Self::MissingErrorHandling,
    ];

    /// Stable name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::SecurityIssue => "SecurityIssue",
            Self::ComparisonBug => "ComparisonBug",
            Self::BareExcept => "BareExcept",
            Self::MutableDefault => "MutableDefault",
            Self::TypeCheckBug => "TypeCheckBug",
            Self::ImportIssue => "ImportIssue",
            Self::ResourceLeak => "ResourceLeak",
            Self::DatabaseIssue => "DatabaseIssue",
            Self::APIIssue => "APIIssue",
            Self::ErrorHandling => "ErrorHandling",
            Self::EmptyFunction => "EmptyFunction",
            Self::DuplicateException => "DuplicateException",
            Self::PerformanceIssue => "PerformanceIssue",
            Self::StyleIssue => "StyleIssue",
            Self::Accessibility => "Accessibility",
            Self::DeprecatedCode => "DeprecatedCode",
            Self::CodeQuality => "CodeQuality",
            Self::AssignmentInCondition => "AssignmentInCondition",
            Self::SyntaxError => "SyntaxError",
            Self::FileError => "FileError",
            Self::AnalysisError => "AnalysisError",
            Self::LongFunction => "LongFunction",
            Self::MissingLogging => "MissingLogging",
            Self::MissingErrorHandling => "MissingErrorHandling",
        }
    }

    /// Look a kind up by its stable name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Fixed severity of the kind
    pub fn severity(&self) -> Severity {
        match self {
            Self::SecurityIssue | Self::SyntaxError => Severity::Critical,
            Self::StyleIssue
            | Self::CodeQuality
            | Self::PerformanceIssue
            | Self::MissingLogging => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Kinds too context-dependent for line rules, handled by the rewrite collaborator
    pub fn is_routed(&self) -> bool {
        matches!(
            self,
            Self::LongFunction | Self::MissingLogging | Self::MissingErrorHandling
        )
    }

    /// Kinds describing the state of the file itself; they cannot be switched off
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::SyntaxError | Self::FileError | Self::AnalysisError)
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single detected defect.
///
/// `line` is 1-based; `0` marks a file-level issue (unreadable file,
/// detector fault, module-wide concern).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Taxonomy tag
    pub kind: IssueKind,

    /// Human-readable description
    pub message: String,

    /// 1-based source line, 0 for file-level issues
    pub line: usize,
}

impl Issue {
    /// Create a new issue
    pub fn new(kind: IssueKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
        }
    }

    /// Whether the issue applies to the whole file
    pub fn is_file_level(&self) -> bool {
        self.line == 0
    }

    /// Shortcut for the kind's severity
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}
