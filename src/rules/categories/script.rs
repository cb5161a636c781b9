//! JavaScript and TypeScript line rules

use super::{check_trailing_whitespace, LineRules, RuleOptions};
use crate::rules::patterns::{
    JS_ASSIGN_IN_IF, JS_CONSOLE_LOG, JS_EVAL, JS_INNER_HTML, JS_REJECT_UNAUTHORIZED,
    JS_TEMPLATE_QUERY, JS_VAR,
};
use crate::rules::results::{Issue, IssueKind};
use crate::rules::source::LineView;

/// A loose equality operator found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LooseOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

/// Byte offsets of every loose `==` / `!=` on a line.
///
/// The offset points at the first character of the operator; inserting one
/// `=` right after it yields the strict form.
pub(crate) fn loose_operators(line: &str) -> Vec<(usize, LooseOperator)> {
    let bytes = line.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i + 1] != b'=' {
            i += 1;
            continue;
        }
        let strict = bytes.get(i + 2) == Some(&b'=');
        match bytes[i] {
            b'=' => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                if !strict && !matches!(prev, b'=' | b'!' | b'<' | b'>') {
                    found.push((i, LooseOperator::Equal));
                }
            }
            b'!' => {
                if !strict {
                    found.push((i, LooseOperator::NotEqual));
                }
            }
            _ => {
                i += 1;
                continue;
            }
        }
        // Skip past the operator, including a strict third character
        i += if strict { 3 } else { 2 };
    }

    found
}

/// Line battery for JavaScript and TypeScript sources
pub struct ScriptRules;

impl LineRules for ScriptRules {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn check(&self, line: &LineView<'_>, _options: &RuleOptions, issues: &mut Vec<Issue>) {
        let text = line.text;
        let mut report = |kind: IssueKind, message: &str| {
            issues.push(Issue::new(kind, message, line.number));
        };

        if JS_EVAL.is_match(text) {
            report(IssueKind::SecurityIssue, "Avoid eval() - security risk");
        }
        if JS_INNER_HTML.is_match(text) {
            report(
                IssueKind::SecurityIssue,
                "innerHTML can cause XSS - use textContent",
            );
        }

        let operators = loose_operators(text);
        if operators.iter().any(|(_, op)| *op == LooseOperator::Equal) {
            report(IssueKind::ComparisonBug, "Use === instead of ==");
        }
        if operators.iter().any(|(_, op)| *op == LooseOperator::NotEqual) {
            report(IssueKind::ComparisonBug, "Use !== instead of !=");
        }

        if JS_VAR.is_match(text) {
            report(IssueKind::DeprecatedCode, "Use let or const instead of var");
        }
        if JS_CONSOLE_LOG.is_match(text) {
            report(IssueKind::CodeQuality, "Remove console.log in production");
        }
        if JS_REJECT_UNAUTHORIZED.is_match(text) {
            report(
                IssueKind::SecurityIssue,
                "TLS certificate verification disabled - security risk",
            );
        }
        if JS_TEMPLATE_QUERY.is_match(text) {
            report(
                IssueKind::SecurityIssue,
                "SQL injection risk - use parameterized queries",
            );
        }
        if JS_ASSIGN_IN_IF.is_match(text) {
            report(
                IssueKind::AssignmentInCondition,
                "Assignment in condition - did you mean === ?",
            );
        }

        check_trailing_whitespace(line, issues);
    }
}
