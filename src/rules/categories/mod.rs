//! Rule categories
//!
//! One line battery per language family. Each battery sees a single line plus
//! a bounded window of its surroundings and never the whole program.

pub mod markup;
pub mod python;
pub mod script;
pub mod stylesheet;

use crate::rules::results::{Issue, IssueKind};
use crate::rules::source::LineView;
use crate::scanner::Language;

/// Knobs shared by every battery
#[derive(Debug, Clone, Copy)]
pub struct RuleOptions {
    /// Enable the predicates that look at the surrounding character window
    pub deep_heuristics: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            deep_heuristics: true,
        }
    }
}

/// An ordered battery of line predicates for one language family
pub trait LineRules: Send + Sync {
    /// Battery name, used in logs
    fn name(&self) -> &'static str;

    /// Run every predicate against `line`, appending issues in firing order
    fn check(&self, line: &LineView<'_>, options: &RuleOptions, issues: &mut Vec<Issue>);
}

/// The battery a language is dispatched to, if any
pub fn battery_for(language: Language) -> Option<&'static dyn LineRules> {
    match language {
        Language::Python => Some(&python::PythonRules),
        Language::JavaScript => Some(&script::ScriptRules),
        Language::Html => Some(&markup::MarkupRules),
        Language::Stylesheet => Some(&stylesheet::StylesheetRules),
        Language::Other => None,
    }
}

/// Shared last predicate of every battery
pub(crate) fn check_trailing_whitespace(line: &LineView<'_>, issues: &mut Vec<Issue>) {
    if line.has_trailing_whitespace() {
        issues.push(Issue::new(
            IssueKind::StyleIssue,
            "Trailing whitespace",
            line.number,
        ));
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_for() {
        assert_eq!(battery_for(Language::Python).unwrap().name(), "python");
        assert_eq!(battery_for(Language::JavaScript).unwrap().name(), "javascript");
        assert_eq!(battery_for(Language::Html).unwrap().name(), "html");
        assert_eq!(battery_for(Language::Stylesheet).unwrap().name(), "stylesheet");
        assert!(battery_for(Language::Other).is_none());
    }
}
