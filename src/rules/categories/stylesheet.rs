//! CSS, SCSS and Sass line rules
//!
//! Stylesheet lines are never skipped as comments.

use super::{check_trailing_whitespace, LineRules, RuleOptions};
use crate::rules::patterns::CSS_SHORT_HEX;
use crate::rules::results::{Issue, IssueKind};
use crate::rules::source::LineView;

/// Line battery for stylesheets
pub struct StylesheetRules;

impl LineRules for StylesheetRules {
    fn name(&self) -> &'static str {
        "stylesheet"
    }

    fn check(&self, line: &LineView<'_>, _options: &RuleOptions, issues: &mut Vec<Issue>) {
        if line.text.contains("!important") {
            issues.push(Issue::new(
                IssueKind::CodeQuality,
                "Avoid !important - refactor specificity",
                line.number,
            ));
        }
        if CSS_SHORT_HEX.is_match(line.text) {
            issues.push(Issue::new(
                IssueKind::StyleIssue,
                "Use 6-digit hex colors for consistency",
                line.number,
            ));
        }

        check_trailing_whitespace(line, issues);
    }
}
