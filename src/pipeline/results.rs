//! Run result structures

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::rules::results::{Issue, Severity};
use crate::utils::RunTiming;

/// Terminal state of one file in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// No issues
    Clean,
    /// Issues found and left in place
    Flagged,
    /// Issues found, patch validated and persisted
    Fixed,
    /// A step faulted; the file was skipped
    Error,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clean => "clean",
            Self::Flagged => "flagged",
            Self::Fixed => "fixed",
            Self::Error => "error",
        })
    }
}

/// An issue together with the file it was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundIssue {
    /// File path as discovered
    pub file: PathBuf,
    /// The issue
    #[serde(flatten)]
    pub issue: Issue,
}

/// Outcome of the fix stage for one file
#[derive(Debug, Clone, Serialize)]
pub struct FixRecord {
    /// File path as discovered
    pub file: PathBuf,
    /// Final state
    pub status: FileStatus,
    /// Number of issues the file had
    pub issue_count: usize,
    /// Why the file was not fixed, when it wasn't
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Backup written before the fix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
}

/// Aggregate result of one pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    /// Files processed (after the per-run ceiling)
    pub scanned_files: usize,
    /// Files with at least one issue
    pub files_with_issues: usize,
    /// Files rewritten on disk
    pub files_fixed: usize,
    /// Every issue, grouped by file in path order, detection order within a file
    pub issues_found: Vec<FoundIssue>,
    /// One record per file that went through the fix stage
    pub fixes_applied: Vec<FixRecord>,
    /// Wall-clock split of the run
    pub timing: RunTiming,
}

impl RunResult {
    /// Count issues with the given severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues_found
            .iter()
            .filter(|f| f.issue.severity() == severity)
            .count()
    }

    /// Check if there are any critical issues
    pub fn has_critical(&self) -> bool {
        self.count_by_severity(Severity::Critical) > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.count_by_severity(Severity::Warning) > 0
    }

    /// Issues remaining after the run
    ///
    /// Issues of files that were fixed are considered resolved.
    pub fn remaining_issues(&self) -> impl Iterator<Item = &FoundIssue> {
        self.issues_found.iter().filter(move |found| {
            !self
                .fixes_applied
                .iter()
                .any(|r| r.status == FileStatus::Fixed && r.file == found.file)
        })
    }

    /// Records with the given status
    pub fn records_with_status(&self, status: FileStatus) -> impl Iterator<Item = &FixRecord> {
        self.fixes_applied.iter().filter(move |r| r.status == status)
    }
}
