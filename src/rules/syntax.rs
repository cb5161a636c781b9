//! Python syntax tree checks
//!
//! Parses Python sources with tree-sitter and runs the structural checks that
//! line patterns cannot express reliably: empty function bodies, repeated
//! exception handlers and comparisons against boolean literals. The parse also
//! decides whether a file is syntactically valid at all.
//!
//! Parsers are pooled per thread; building one per file is measurably slower
//! on large scans.

use std::cell::RefCell;
use std::collections::HashSet;
use tree_sitter::{Node, Parser, Tree};

use super::results::{Issue, IssueKind};
use super::source::SourceLines;
use crate::error::AnalysisError;

thread_local! {
    static PYTHON_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// Longest snippet quoted in a syntax error message
const SNIPPET_CHARS: usize = 30;

/// Run `f` with this thread's Python parser, creating it on first use
fn with_python_parser<F, R>(f: F) -> Result<R, AnalysisError>
where
    F: FnOnce(&mut Parser) -> R,
{
    PYTHON_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let parser = match slot.take() {
            Some(parser) => parser,
            None => new_python_parser()?,
        };
        Ok(f(slot.insert(parser)))
    })
}

fn new_python_parser() -> Result<Parser, AnalysisError> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| AnalysisError::Grammar {
            language: "python",
            message: e.to_string(),
        })?;
    Ok(parser)
}

/// A function definition and the lines it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    pub name: String,
    /// 1-based line of the `def`
    pub start_line: usize,
    /// 1-based last line of the body
    pub end_line: usize,
}

impl FunctionSpan {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// A parsed Python source
pub struct PythonTree<'s> {
    tree: Tree,
    source: &'s str,
}

impl<'s> PythonTree<'s> {
    /// Parse a source with the pooled parser
    pub fn parse(source: &'s str) -> Result<Self, AnalysisError> {
        let tree = with_python_parser(|parser| parser.parse(source, None))?
            .ok_or(AnalysisError::NoTree { language: "python" })?;
        Ok(Self { tree, source })
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// The earliest ERROR or MISSING node as a single issue, if the tree has one
    pub fn syntax_error(&self) -> Option<Issue> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }

        let mut first: Option<Node<'_>> = None;
        visit_all(root, |node| {
            if !(node.is_error() || node.is_missing()) {
                return;
            }
            let earlier = first.map_or(true, |current| {
                let (a, b) = (node.start_position(), current.start_position());
                (a.row, a.column) < (b.row, b.column)
            });
            if earlier {
                first = Some(node);
            }
        });

        // has_error without a visible node should not happen; report the top
        let node = first.unwrap_or(root);
        let message = if node.is_missing() {
            format!("Syntax error: missing '{}'", node.kind())
        } else {
            let snippet: String = self
                .text(node)
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .chars()
                .take(SNIPPET_CHARS)
                .collect();
            if snippet.is_empty() {
                "Syntax error: invalid syntax".to_string()
            } else {
                format!("Syntax error: unexpected '{}'", snippet)
            }
        };

        Some(Issue::new(
            IssueKind::SyntaxError,
            message,
            node.start_position().row + 1,
        ))
    }

    /// Empty functions, duplicate handlers and boolean comparisons, in source order
    pub fn structural_issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        visit_all(self.tree.root_node(), |node| match node.kind() {
            "function_definition" => {
                if is_pass_only(node) {
                    let name = node
                        .child_by_field_name("name")
                        .map(|n| self.text(n))
                        .unwrap_or("<anonymous>");
                    issues.push(Issue::new(
                        IssueKind::EmptyFunction,
                        format!("Empty function: {}", name),
                        node.start_position().row + 1,
                    ));
                }
            }
            "try_statement" => self.check_duplicate_handlers(node, &mut issues),
            "comparison_operator" => self.check_boolean_comparison(node, &mut issues),
            _ => {}
        });

        issues
    }

    fn check_duplicate_handlers(&self, try_node: Node<'_>, issues: &mut Vec<Issue>) {
        let mut seen = HashSet::new();
        let mut cursor = try_node.walk();

        for clause in try_node.named_children(&mut cursor) {
            if !matches!(clause.kind(), "except_clause" | "except_group_clause") {
                continue;
            }
            let Some(handled) = self.handled_type(clause) else {
                continue;
            };
            if !seen.insert(handled.clone()) {
                issues.push(Issue::new(
                    IssueKind::DuplicateException,
                    format!("Duplicate exception handler: {}", handled),
                    clause.start_position().row + 1,
                ));
            }
        }
    }

    /// Exception type named by an except clause, whitespace removed
    fn handled_type(&self, clause: Node<'_>) -> Option<String> {
        let mut cursor = clause.walk();
        let mut target = clause
            .named_children(&mut cursor)
            .find(|c| !matches!(c.kind(), "block" | "comment"))?;

        if target.kind() == "as_pattern" {
            let mut inner = target.walk();
            target = target.named_children(&mut inner).next()?;
        }

        let text: String = self
            .text(target)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    fn check_boolean_comparison(&self, node: Node<'_>, issues: &mut Vec<Issue>) {
        let mut cursor = node.walk();
        let mut after_eq = false;

        for child in node.children(&mut cursor) {
            let kind = child.kind();
            if after_eq && matches!(kind, "true" | "false") {
                issues.push(Issue::new(
                    IssueKind::ComparisonBug,
                    format!("Comparing with {} - use \"is\" instead", self.text(child)),
                    child.start_position().row + 1,
                ));
            }
            after_eq = kind == "==";
        }
    }

    /// 1-based lines that sit inside multi-line string literals
    ///
    /// The opening line is kept; the closing line is skipped only when nothing
    /// but whitespace follows the literal.
    pub fn string_interior_lines(&self) -> HashSet<usize> {
        let lines = SourceLines::new(self.source);
        let mut interior = HashSet::new();

        visit_all(self.tree.root_node(), |node| {
            if node.kind() != "string" {
                return;
            }
            let start = node.start_position();
            let end = node.end_position();
            if end.row <= start.row {
                return;
            }

            for row in start.row + 1..end.row {
                interior.insert(row + 1);
            }

            let closes_line = lines
                .get(end.row + 1)
                .and_then(|line| line.get(end.column..))
                .map_or(true, |rest| rest.trim().is_empty());
            if closes_line {
                interior.insert(end.row + 1);
            }
        });

        interior
    }

    /// Lines that begin inside a multi-line string literal.
    ///
    /// Every line after the opening one, closing line included; changing the
    /// leading whitespace of any of them changes the string's value.
    pub fn string_continuation_lines(&self) -> HashSet<usize> {
        let mut continued = HashSet::new();
        visit_all(self.tree.root_node(), |node| {
            if node.kind() == "string" {
                let (start, end) = (node.start_position().row, node.end_position().row);
                continued.extend(start + 2..=end + 1);
            }
        });
        continued
    }

    /// Every function definition, in source order
    pub fn functions(&self) -> Vec<FunctionSpan> {
        let mut functions = Vec::new();

        visit_all(self.tree.root_node(), |node| {
            if node.kind() == "function_definition" {
                functions.push(FunctionSpan {
                    name: node
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default(),
                    start_line: node.start_position().row + 1,
                    end_line: node.end_position().row + 1,
                });
            }
        });

        functions
    }
}

/// Whether a function body holds nothing but `pass` (comments aside)
fn is_pass_only(function: Node<'_>) -> bool {
    let Some(body) = function.child_by_field_name("body") else {
        return false;
    };
    let mut cursor = body.walk();
    let statements: Vec<_> = body
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect();
    statements.len() == 1 && statements[0].kind() == "pass_statement"
}

/// Pre-order traversal of every node below and including `root`
fn visit_all<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> PythonTree<'_> {
        PythonTree::parse(source).unwrap()
    }

    #[test]
    fn test_valid_source_has_no_syntax_error() {
        let tree = parse("def f(x):\n    return x + 1\n");
        assert!(tree.syntax_error().is_none());
    }

    #[test]
    fn test_syntax_error_reports_first_bad_line() {
        let source = "x = 1\ny = 2\ndef broken(:\n    pass\nz = (\n";
        let issue = parse(source).syntax_error().unwrap();
        assert_eq!(issue.kind, IssueKind::SyntaxError);
        assert_eq!(issue.line, 3);
        assert!(issue.message.starts_with("Syntax error"));
    }

    #[test]
    fn test_empty_function() {
        let source = "def todo():\n    pass\n\ndef real():\n    return 1\n";
        let issues = parse(source).structural_issues();
        assert_eq!(
            issues,
            vec![Issue::new(IssueKind::EmptyFunction, "Empty function: todo", 1)]
        );
    }

    #[test]
    fn test_empty_function_ignores_comments() {
        let source = "def later():\n    # filled in by subclasses\n    pass\n";
        let issues = parse(source).structural_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 1);
    }

    #[test]
    fn test_function_with_docstring_and_pass_is_not_empty() {
        let source = "def documented():\n    \"\"\"Doc.\"\"\"\n    pass\n";
        assert!(parse(source).structural_issues().is_empty());
    }

    #[test]
    fn test_duplicate_exception_handlers() {
        let source = "\
try:
    work()
except ValueError:
    a()
except KeyError as e:
    b()
except ValueError as err:
    c()
";
        let issues = parse(source).structural_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DuplicateException);
        assert_eq!(issues[0].line, 7);
        assert_eq!(issues[0].message, "Duplicate exception handler: ValueError");
    }

    #[test]
    fn test_boolean_comparison() {
        let source = "if ready == True:\n    go()\nif done == x:\n    stop()\n";
        let issues = parse(source).structural_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::ComparisonBug);
        assert_eq!(issues[0].line, 1);
        assert_eq!(issues[0].message, "Comparing with True - use \"is\" instead");
    }

    #[test]
    fn test_string_interior_lines() {
        let source = "x = 1\ndoc = \"\"\"\neval(payload)\n\"\"\"\ny = 2\n";
        let interior = parse(source).string_interior_lines();
        assert_eq!(interior, [3, 4].into_iter().collect());
    }

    #[test]
    fn test_string_closing_line_with_code_is_kept() {
        let source = "q = '''\nSELECT 1\n'''; run(q)\n";
        let interior = parse(source).string_interior_lines();
        assert_eq!(interior, [2].into_iter().collect());
    }

    #[test]
    fn test_string_continuation_lines_include_closing_code() {
        let source = "q = '''\nSELECT 1\n'''; run(q)\nx = 'one line'\n";
        let continued = parse(source).string_continuation_lines();
        assert_eq!(continued, [2, 3].into_iter().collect());
    }

    #[test]
    fn test_functions() {
        let source = "def a():\n    x = 1\n    return x\n\nasync def b():\n    pass\n";
        let functions = parse(source).functions();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "a");
        assert_eq!(functions[0].line_count(), 3);
        assert_eq!(functions[1].start_line, 5);
    }

    #[test]
    fn test_parser_reused_across_calls() {
        for _ in 0..3 {
            assert!(parse("pass\n").syntax_error().is_none());
        }
    }
}
