//! HTML line rules

use super::{check_trailing_whitespace, LineRules, RuleOptions};
use crate::rules::patterns::{
    HTML_ALT, HTML_DEPRECATED_TAG, HTML_IMG, HTML_INLINE_STYLE, HTML_STYLE_TAG,
};
use crate::rules::results::{Issue, IssueKind};
use crate::rules::source::LineView;

/// Line battery for HTML documents
pub struct MarkupRules;

impl LineRules for MarkupRules {
    fn name(&self) -> &'static str {
        "html"
    }

    fn check(&self, line: &LineView<'_>, _options: &RuleOptions, issues: &mut Vec<Issue>) {
        let text = line.text;

        if HTML_IMG.is_match(text) && !HTML_ALT.is_match(text) {
            issues.push(Issue::new(
                IssueKind::Accessibility,
                "Image missing alt attribute",
                line.number,
            ));
        }
        if HTML_INLINE_STYLE.is_match(text) && !HTML_STYLE_TAG.is_match(text) {
            issues.push(Issue::new(
                IssueKind::CodeQuality,
                "Avoid inline styles - use CSS",
                line.number,
            ));
        }
        if HTML_DEPRECATED_TAG.is_match(text) {
            issues.push(Issue::new(
                IssueKind::DeprecatedCode,
                "Deprecated HTML tag - use CSS",
                line.number,
            ));
        }

        check_trailing_whitespace(line, issues);
    }
}
