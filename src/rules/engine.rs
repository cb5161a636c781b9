//! Issue detection engine

use std::collections::HashSet;
use tracing::{debug, span, trace, Level};

use super::categories::{battery_for, RuleOptions};
use super::context;
use super::results::{Issue, IssueKind};
use super::source::SourceLines;
use super::syntax::PythonTree;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::scanner::{FileRecord, Language};

/// Detects issues in a single file.
///
/// Deterministic: the same bytes always produce the same issue list, in the
/// same order. Syntax tree issues come first, then line issues in line order.
#[derive(Debug, Clone)]
pub struct IssueDetector {
    options: RuleOptions,
    disabled: HashSet<IssueKind>,
    only_kinds: Option<Vec<IssueKind>>,
    skip_kinds: Option<Vec<IssueKind>>,
}

impl Default for IssueDetector {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl IssueDetector {
    /// Create a detector from the analysis and rule configuration
    pub fn new(config: &Config) -> Self {
        Self {
            options: RuleOptions {
                deep_heuristics: config.analysis.deep_heuristics,
            },
            disabled: IssueKind::ALL
                .iter()
                .copied()
                .filter(|kind| !config.is_rule_enabled(kind.name()))
                .collect(),
            only_kinds: None,
            skip_kinds: None,
        }
    }

    /// Set kinds to exclusively report
    pub fn set_only_kinds(&mut self, kinds: Vec<IssueKind>) {
        self.only_kinds = Some(kinds);
    }

    /// Set kinds to suppress
    pub fn set_skip_kinds(&mut self, kinds: Vec<IssueKind>) {
        self.skip_kinds = Some(kinds);
    }

    /// Check if an issue kind should be reported
    fn should_report(&self, kind: IssueKind) -> bool {
        if kind.is_reserved() {
            return true;
        }
        if self.disabled.contains(&kind) {
            return false;
        }

        if let Some(only) = &self.only_kinds {
            return only.contains(&kind);
        }

        if let Some(skip) = &self.skip_kinds {
            return !skip.contains(&kind);
        }

        true
    }

    /// Drop the issues this detector is configured not to report
    pub fn filter(&self, mut issues: Vec<Issue>) -> Vec<Issue> {
        issues.retain(|issue| self.should_report(issue.kind));
        issues
    }

    /// Analyze a file read from disk
    pub fn analyze(&self, file: &FileRecord) -> Result<Vec<Issue>, AnalysisError> {
        self.detect(file).map(|issues| self.filter(issues))
    }

    /// Every issue in a file, ignoring rule toggles and kind filters.
    ///
    /// This is what the analysis cache stores; `filter` turns it into what a
    /// run reports.
    pub fn detect(&self, file: &FileRecord) -> Result<Vec<Issue>, AnalysisError> {
        let span = span!(Level::DEBUG, "analyze", path = %file.path.display());
        let _guard = span.enter();
        self.detect_source(file.language, &file.content)
    }

    /// Analyze in-memory content as the given language.
    ///
    /// Languages without a battery yield no issues. A Python source that does
    /// not parse yields exactly one `SyntaxError` and nothing else.
    pub fn analyze_source(
        &self,
        language: Language,
        content: &str,
    ) -> Result<Vec<Issue>, AnalysisError> {
        self.detect_source(language, content)
            .map(|issues| self.filter(issues))
    }

    fn detect_source(
        &self,
        language: Language,
        content: &str,
    ) -> Result<Vec<Issue>, AnalysisError> {
        let Some(battery) = battery_for(language) else {
            trace!(language = language.name(), "No rule battery");
            return Ok(Vec::new());
        };

        let mut issues = Vec::new();
        let mut string_lines = HashSet::new();

        if language == Language::Python {
            let tree = PythonTree::parse(content)?;
            if let Some(error) = tree.syntax_error() {
                debug!(line = error.line, "Syntax error, skipping line rules");
                return Ok(vec![error]);
            }
            issues.extend(tree.structural_issues());
            string_lines = tree.string_interior_lines();
        }

        let comment_prefixes = language.comment_prefixes();
        for line in SourceLines::new(content).iter() {
            if string_lines.contains(&line.number) || line.is_comment(comment_prefixes) {
                continue;
            }
            battery.check(&line, &self.options, &mut issues);
        }

        debug!(
            battery = battery.name(),
            issues_count = issues.len(),
            "Analysis complete"
        );

        Ok(issues)
    }

    /// Module-level issues meant for the rewrite collaborator
    pub fn analyze_context(&self, file: &FileRecord) -> Result<Vec<Issue>, AnalysisError> {
        let issues = context::context_issues(file.language, &file.content)?;
        Ok(self.filter(issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use pretty_assertions::assert_eq;

    fn kinds_and_lines(issues: &[Issue]) -> Vec<(IssueKind, usize)> {
        issues.iter().map(|i| (i.kind, i.line)).collect()
    }

    #[test]
    fn test_python_none_comparison() {
        let detector = IssueDetector::default();
        let issues = detector
            .analyze_source(Language::Python, "def f(x):\n    if x == None:\n        return 1\n")
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::ComparisonBug);
        assert_eq!(issues[0].line, 2);
        assert_eq!(issues[0].message, "Use 'is None' instead of '== None'");
    }

    #[test]
    fn test_syntax_error_suppresses_everything_else() {
        let detector = IssueDetector::default();
        let source = "x = eval(a)\nif x == None\n    pass\n";
        let issues = detector.analyze_source(Language::Python, source).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::SyntaxError);
        assert_eq!(issues[0].line, 2);
    }

    #[test]
    fn test_tree_issues_come_first() {
        let detector = IssueDetector::default();
        let source = "x = 1 \ndef stub():\n    pass\n";
        let issues = detector.analyze_source(Language::Python, source).unwrap();

        assert_eq!(
            kinds_and_lines(&issues),
            vec![(IssueKind::EmptyFunction, 2), (IssueKind::StyleIssue, 1)]
        );
    }

    #[test]
    fn test_comments_and_docstrings_skipped() {
        let detector = IssueDetector::default();
        let source = "\
def run(code):
    \"\"\"Run a snippet.

    Never call eval(code) here.
    exec(code) is banned too.
    \"\"\"
    # eval(code) would be unsafe
    return len(code)
";
        let issues = detector.analyze_source(Language::Python, source).unwrap();
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_crlf_matches_lf() {
        let detector = IssueDetector::default();
        let lf = "var a = 1;\nif (a == 2) {}\n";
        let crlf = lf.replace('\n', "\r\n");

        let from_lf = detector.analyze_source(Language::JavaScript, lf).unwrap();
        let from_crlf = detector.analyze_source(Language::JavaScript, &crlf).unwrap();

        assert_eq!(from_lf, from_crlf);
        assert_eq!(
            kinds_and_lines(&from_lf),
            vec![(IssueKind::DeprecatedCode, 1), (IssueKind::ComparisonBug, 2)]
        );
    }

    #[test]
    fn test_javascript_comment_lines_skipped() {
        let detector = IssueDetector::default();
        let source = "// eval(x)\n/* var a */\n * console.log(a)\nconsole.log(b);\n";
        let issues = detector.analyze_source(Language::JavaScript, source).unwrap();
        assert_eq!(kinds_and_lines(&issues), vec![(IssueKind::CodeQuality, 4)]);
    }

    #[test]
    fn test_unsupported_language_is_clean() {
        let detector = IssueDetector::default();
        let issues = detector
            .analyze_source(Language::Other, "fn main() { eval(x) }   \n")
            .unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_empty_file_is_clean() {
        let detector = IssueDetector::default();
        for language in [Language::Python, Language::JavaScript, Language::Html, Language::Stylesheet] {
            assert!(detector.analyze_source(language, "").unwrap().is_empty());
        }
    }

    #[test]
    fn test_only_and_skip_kinds() {
        let source = "var a = 1; \n";

        let mut only = IssueDetector::default();
        only.set_only_kinds(vec![IssueKind::StyleIssue]);
        let issues = only.analyze_source(Language::JavaScript, source).unwrap();
        assert_eq!(kinds_and_lines(&issues), vec![(IssueKind::StyleIssue, 1)]);

        let mut skip = IssueDetector::default();
        skip.set_skip_kinds(vec![IssueKind::StyleIssue]);
        let issues = skip.analyze_source(Language::JavaScript, source).unwrap();
        assert_eq!(kinds_and_lines(&issues), vec![(IssueKind::DeprecatedCode, 1)]);
    }

    #[test]
    fn test_detect_ignores_filters() {
        let source = "var a = 1; \n";
        let mut only = IssueDetector::default();
        only.set_only_kinds(vec![IssueKind::StyleIssue]);

        let all = only.detect_source(Language::JavaScript, source).unwrap();
        assert_eq!(
            kinds_and_lines(&all),
            vec![(IssueKind::DeprecatedCode, 1), (IssueKind::StyleIssue, 1)]
        );
        assert_eq!(
            kinds_and_lines(&only.filter(all)),
            vec![(IssueKind::StyleIssue, 1)]
        );
    }

    #[test]
    fn test_config_disables_kinds_but_not_reserved() {
        let mut config = Config::default();
        config
            .rules
            .insert("StyleIssue".to_string(), RuleConfig { enabled: false });
        config
            .rules
            .insert("SyntaxError".to_string(), RuleConfig { enabled: false });
        let detector = IssueDetector::new(&config);

        let clean = detector
            .analyze_source(Language::Stylesheet, "a { color: red; }  \n")
            .unwrap();
        assert!(clean.is_empty());

        let broken = detector.analyze_source(Language::Python, "def (:\n").unwrap();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].kind, IssueKind::SyntaxError);
    }

    #[test]
    fn test_deterministic() {
        let detector = IssueDetector::default();
        let source = "import os\nfrom x import *\ndef f(a=[]):\n    if type(a) == list:\n        pass\n";
        let first = detector.analyze_source(Language::Python, source).unwrap();
        for _ in 0..5 {
            assert_eq!(detector.analyze_source(Language::Python, source).unwrap(), first);
        }
    }

    #[test]
    fn test_issue_lines_within_file() {
        let detector = IssueDetector::default();
        let source = "<img src=\"a.png\">\n<center>x</center> ";
        let issues = detector.analyze_source(Language::Html, source).unwrap();
        let line_count = source.split('\n').count();
        assert!(!issues.is_empty());
        assert!(issues.iter().all(|i| i.line >= 1 && i.line <= line_count));
    }
}
