//! Patch engine - Turns an issue list into candidate content

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::collaborator::{RewriteBudget, RewriteCollaborator};
use super::plan::{InsertQueue, Rewrite, Side};
use super::planner;
use crate::config::CollaboratorConfig;
use crate::error::CollaboratorError;
use crate::rules::patterns::PY_PREAMBLE;
use crate::rules::results::Issue;
use crate::scanner::{FileRecord, Language};

/// Number of leading lines that may hold a shebang or encoding declaration
const PREAMBLE_LINES: usize = 2;

/// Applies deterministic rewrites and, optionally, a rewrite collaborator
#[derive(Clone)]
pub struct PatchEngine {
    collaborator: Option<Arc<dyn RewriteCollaborator>>,
    budget: RewriteBudget,
    timeout: Duration,
}

impl Default for PatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchEngine")
            .field(
                "collaborator",
                &self.collaborator.as_ref().map(|c| c.name().to_string()),
            )
            .field("budget", &self.budget)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PatchEngine {
    /// Engine with deterministic rewrites only
    pub fn new() -> Self {
        Self {
            collaborator: None,
            budget: RewriteBudget::default(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Attach a collaborator with the budget and timeout from `config`
    pub fn with_collaborator(
        mut self,
        collaborator: Arc<dyn RewriteCollaborator>,
        config: &CollaboratorConfig,
    ) -> Self {
        self.collaborator = Some(collaborator);
        self.budget = RewriteBudget::from(config);
        self.timeout = Duration::from_secs(config.timeout_secs);
        self
    }

    /// Override the collaborator timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_collaborator(&self) -> bool {
        self.collaborator.is_some()
    }

    /// Produce the candidate content for a file
    ///
    /// Without a collaborator every issue goes through the deterministic
    /// rewrites. With one, routed issues are offered to it together with the
    /// deterministically repaired text; a collaborator failure falls back to
    /// the deterministic result, a timeout is returned as an error.
    pub async fn fix(
        &self,
        file: &FileRecord,
        issues: &[Issue],
    ) -> Result<String, CollaboratorError> {
        let Some(collaborator) = &self.collaborator else {
            return Ok(self.apply_rules(file.language, &file.content, issues));
        };

        let (routed, direct): (Vec<Issue>, Vec<Issue>) =
            issues.iter().cloned().partition(|i| i.kind.is_routed());
        if routed.is_empty() {
            return Ok(self.apply_rules(file.language, &file.content, &direct));
        }

        let deterministic = self.apply_rules(file.language, &file.content, &direct);
        if let Err(e) = self.budget.check(&deterministic) {
            debug!(path = %file.path.display(), error = %e, "Skipping collaborator");
            return Ok(self.apply_rules(file.language, &file.content, issues));
        }

        let offered = &routed[..routed.len().min(self.budget.max_issues)];
        debug!(
            path = %file.path.display(),
            collaborator = collaborator.name(),
            issues = offered.len(),
            "Offering rewrite"
        );

        match tokio::time::timeout(
            self.timeout,
            collaborator.rewrite(&deterministic, offered, &self.budget),
        )
        .await
        {
            Err(_) => Err(CollaboratorError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
            Ok(Ok(rewritten)) => Ok(rewritten),
            Ok(Err(e)) => {
                warn!(
                    path = %file.path.display(),
                    error = %e,
                    "Rewrite collaborator failed, using deterministic fixes"
                );
                Ok(self.apply_rules(file.language, &file.content, issues))
            }
        }
    }

    /// Apply the deterministic rewrite of every issue to `content`
    ///
    /// Replacements land immediately so later issues on the same line see
    /// the current text. Insertions are spliced in afterwards, bottom-up, and
    /// document prepends come last.
    pub fn apply_rules(&self, language: Language, content: &str, issues: &[Issue]) -> String {
        let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let mut lines: Vec<String> = content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();

        let mut inserts = InsertQueue::default();
        let mut prepends: Vec<Rewrite> = Vec::new();

        for issue in issues {
            for rewrite in planner::plan(issue, language, &lines) {
                match rewrite {
                    Rewrite::Replace { line, text } => {
                        if let Some(slot) = line.checked_sub(1).and_then(|i| lines.get_mut(i)) {
                            *slot = text;
                        }
                    }
                    Rewrite::InsertAfter { line, lines } => inserts.push(line, Side::After, lines),
                    Rewrite::InsertBefore { line, lines } => {
                        inserts.push(line, Side::Before, lines)
                    }
                    prepend @ Rewrite::Prepend { .. } => prepends.push(prepend),
                }
            }
        }

        if !inserts.is_empty() {
            inserts.apply(&mut lines);
        }
        apply_prepends(&mut lines, prepends);

        lines.join(eol)
    }
}

/// Add guarded header lines once, below any shebang or encoding line
fn apply_prepends(lines: &mut Vec<String>, prepends: Vec<Rewrite>) {
    let mut block: Vec<String> = Vec::new();
    for rewrite in prepends {
        let Rewrite::Prepend { lines: header, guard } = rewrite else {
            continue;
        };
        let document = lines.join("\n");
        if guard.is_match(&document) || header.iter().all(|h| block.contains(h)) {
            continue;
        }
        for line in header {
            if !block.contains(&line) {
                block.push(line);
            }
        }
    }
    if block.is_empty() {
        return;
    }

    let at = lines
        .iter()
        .take(PREAMBLE_LINES)
        .take_while(|l| PY_PREAMBLE.is_match(l))
        .count();
    lines.splice(at..at, block);
}

#[cfg(test)]
mod tests {
    use super::super::collaborator::stub::{Behaviour, StubCollaborator};
    use super::*;
    use crate::rules::results::IssueKind;
    use crate::rules::IssueDetector;
    use pretty_assertions::assert_eq;

    fn detect_and_fix(path: &str, content: &str) -> String {
        let file = FileRecord::from_content(path, content);
        let issues = IssueDetector::default().analyze(&file).unwrap();
        PatchEngine::new().apply_rules(file.language, &file.content, &issues)
    }

    fn collaborator_config() -> CollaboratorConfig {
        CollaboratorConfig {
            enabled: true,
            ..CollaboratorConfig::default()
        }
    }

    #[test]
    fn test_same_line_rewrites_compose() {
        let fixed = detect_and_fix("a.py", "if x == None:   \n    pass\n");
        assert_eq!(fixed, "if x is None:\n    pass\n");
    }

    #[test]
    fn test_insertions_keep_later_anchors_valid() {
        let content = "def save(cursor):\n    cursor.execute('A')\n    cursor.execute('B')\n";
        let issues = vec![
            Issue::new(IssueKind::DatabaseIssue, "", 2),
            Issue::new(IssueKind::DatabaseIssue, "", 3),
        ];
        let fixed = PatchEngine::new().apply_rules(Language::Python, content, &issues);
        assert_eq!(
            fixed,
            "def save(cursor):\n    cursor.execute('A')\n    cursor.connection.commit()  # Auto-added\n    cursor.execute('B')\n    cursor.connection.commit()  # Auto-added\n"
        );
    }

    #[test]
    fn test_prepend_after_shebang_and_once() {
        let content = "#!/usr/bin/env python\nx = 1\n";
        let issues = vec![
            Issue::new(IssueKind::MissingLogging, "", 0),
            Issue::new(IssueKind::MissingLogging, "", 0),
        ];
        let fixed = PatchEngine::new().apply_rules(Language::Python, content, &issues);
        assert_eq!(
            fixed,
            "#!/usr/bin/env python\nimport logging\nlogger = logging.getLogger(__name__)\nx = 1\n"
        );
    }

    #[test]
    fn test_prepend_guard_sees_existing_import() {
        let content = "from flask import Flask, jsonify\n\ndef f():\n    return {'a': 1}\n";
        let issues = vec![Issue::new(IssueKind::APIIssue, "", 4)];
        let fixed = PatchEngine::new().apply_rules(Language::Python, content, &issues);
        assert_eq!(
            fixed,
            "from flask import Flask, jsonify\n\ndef f():\n    return jsonify({'a': 1})\n"
        );
    }

    #[test]
    fn test_crlf_is_preserved() {
        let fixed = detect_and_fix("a.py", "try:\r\n    go()\r\nexcept:\r\n    pass\r\n");
        assert_eq!(
            fixed,
            "try:\r\n    go()\r\nexcept Exception:\r\n    pass\r\n"
        );
    }

    #[test]
    fn test_unknown_rewrite_passes_through() {
        let content = "<p style=\"color: red\">hi</p>";
        let fixed = detect_and_fix("page.html", content);
        assert_eq!(fixed, content);
    }

    #[test]
    fn test_mixed_javascript_fixes() {
        let fixed = detect_and_fix(
            "app.js",
            "var total = 0;\nif (total == 0) {\n  console.log(total);\n}\n",
        );
        assert_eq!(
            fixed,
            "let total = 0;\nif (total === 0) {\n  // console.log(total);\n}\n"
        );
    }

    #[tokio::test]
    async fn test_fix_without_collaborator_uses_rules() {
        let file = FileRecord::from_content("a.py", "try:\n    a()\nexcept:\n    b()\n");
        let issues = vec![Issue::new(IssueKind::BareExcept, "", 3)];
        let fixed = PatchEngine::new().fix(&file, &issues).await.unwrap();
        assert_eq!(fixed, "try:\n    a()\nexcept Exception:\n    b()\n");
    }

    #[tokio::test]
    async fn test_collaborator_receives_deterministic_output() {
        let stub = Arc::new(StubCollaborator::new(Behaviour::Annotate));
        let engine = PatchEngine::new().with_collaborator(stub.clone(), &collaborator_config());

        let file = FileRecord::from_content("a.py", "if x == None:\n    pass\n");
        let issues = vec![
            Issue::new(IssueKind::ComparisonBug, "", 1),
            Issue::new(IssueKind::MissingErrorHandling, "", 1),
        ];
        let fixed = engine.fix(&file, &issues).await.unwrap();

        assert_eq!(fixed, "if x is None:\n    pass\n# reviewed\n");
        assert_eq!(stub.calls(), 1);
        assert_eq!(stub.offered(), 1);
    }

    #[tokio::test]
    async fn test_collaborator_answer_is_used_verbatim() {
        let answer = "import logging\n\ndef f():\n    return 1\n".to_string();
        let stub = Arc::new(StubCollaborator::new(Behaviour::Answer(answer.clone())));
        let engine = PatchEngine::new().with_collaborator(stub.clone(), &collaborator_config());

        let file = FileRecord::from_content("a.py", "def f():\n    return 1\n");
        let issues = vec![Issue::new(IssueKind::MissingLogging, "", 0)];
        let fixed = engine.fix(&file, &issues).await.unwrap();

        assert_eq!(fixed, answer);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_collaborator_not_called_without_routed_issues() {
        let stub = Arc::new(StubCollaborator::new(Behaviour::Annotate));
        let engine = PatchEngine::new().with_collaborator(stub.clone(), &collaborator_config());

        let file = FileRecord::from_content("a.py", "x = 1 \n");
        let issues = vec![Issue::new(IssueKind::StyleIssue, "", 1)];
        let fixed = engine.fix(&file, &issues).await.unwrap();

        assert_eq!(fixed, "x = 1\n");
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_collaborator_failure_falls_back() {
        let stub = Arc::new(StubCollaborator::new(Behaviour::Fail));
        let engine = PatchEngine::new().with_collaborator(stub.clone(), &collaborator_config());

        let file = FileRecord::from_content("a.py", "def f():\n    return 1\n");
        let issues = vec![Issue::new(IssueKind::MissingErrorHandling, "", 1)];
        let fixed = engine.fix(&file, &issues).await.unwrap();

        assert_eq!(
            fixed,
            "def f():\n    # TODO: Add try-except error handling\n    return 1\n"
        );
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_collaborator_timeout_is_error() {
        let stub = Arc::new(StubCollaborator::new(Behaviour::Hang(Duration::from_secs(5))));
        let engine = PatchEngine::new()
            .with_collaborator(stub, &collaborator_config())
            .with_timeout(Duration::from_millis(20));

        let file = FileRecord::from_content("a.py", "def f():\n    return 1\n");
        let issues = vec![Issue::new(IssueKind::MissingErrorHandling, "", 1)];
        let result = engine.fix(&file, &issues).await;

        assert!(matches!(result, Err(CollaboratorError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_over_budget_skips_collaborator() {
        let stub = Arc::new(StubCollaborator::new(Behaviour::Annotate));
        let config = CollaboratorConfig {
            max_chars: 10,
            ..collaborator_config()
        };
        let engine = PatchEngine::new().with_collaborator(stub.clone(), &config);

        let file = FileRecord::from_content("a.py", "def compute():\n    return 1\n");
        let issues = vec![Issue::new(IssueKind::LongFunction, "", 1)];
        let fixed = engine.fix(&file, &issues).await.unwrap();

        assert!(fixed.contains("# TODO: Refactor - function too long"));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_issue_budget_caps_offered_issues() {
        let stub = Arc::new(StubCollaborator::new(Behaviour::Annotate));
        let config = CollaboratorConfig {
            max_issues: 2,
            ..collaborator_config()
        };
        let engine = PatchEngine::new().with_collaborator(stub.clone(), &config);

        let file = FileRecord::from_content("a.py", "def a():\n    pass\n");
        let issues: Vec<Issue> = (0..5)
            .map(|_| Issue::new(IssueKind::LongFunction, "", 1))
            .collect();
        engine.fix(&file, &issues).await.unwrap();

        assert_eq!(stub.offered(), 2);
    }
}
