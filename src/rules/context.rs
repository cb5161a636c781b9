//! Module-level context checks
//!
//! These concerns need the whole file to judge and have no safe line-local
//! rewrite, so they are only computed when a rewrite collaborator is available
//! to act on them.

use super::results::{Issue, IssueKind};
use super::source::SourceLines;
use super::syntax::PythonTree;
use crate::error::AnalysisError;
use crate::scanner::Language;

/// Functions longer than this are reported
pub const LONG_FUNCTION_LINES: usize = 50;

/// Modules longer than this are expected to log
pub const LOGGING_MIN_LINES: usize = 50;

/// Collect the context issues of a file, in a fixed order
///
/// Only Python sources are inspected. A file that does not parse yields
/// nothing here; its syntax error is reported by the line detector.
pub fn context_issues(language: Language, content: &str) -> Result<Vec<Issue>, AnalysisError> {
    if language != Language::Python {
        return Ok(Vec::new());
    }

    let tree = PythonTree::parse(content)?;
    if tree.syntax_error().is_some() {
        return Ok(Vec::new());
    }

    let mut issues = Vec::new();
    let functions = tree.functions();

    for function in &functions {
        let length = function.line_count();
        if length > LONG_FUNCTION_LINES {
            issues.push(Issue::new(
                IssueKind::LongFunction,
                format!(
                    "Function '{}' is {} lines long - consider splitting it",
                    function.name, length
                ),
                function.start_line,
            ));
        }
    }

    let uses_logging = content.contains("logging") || content.contains("logger");
    if SourceLines::new(content).len() > LOGGING_MIN_LINES && !uses_logging {
        issues.push(Issue::new(
            IssueKind::MissingLogging,
            "Module has no logging - add a module logger",
            0,
        ));
    }

    if let Some(first) = functions.first() {
        if !content.contains("try:") {
            issues.push(Issue::new(
                IssueKind::MissingErrorHandling,
                "Functions defined without any error handling",
                first.start_line,
            ));
        }
    }

    Ok(issues)
}
