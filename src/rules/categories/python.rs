//! Python line rules
//!
//! Runs after the syntax tree checks, on every line that is neither a comment
//! nor inside a multi-line string literal.

use super::{check_trailing_whitespace, LineRules, RuleOptions};
use crate::rules::patterns::{
    PY_ASSIGN_IN_IF, PY_BARE_EXCEPT, PY_EQ_NONE, PY_EVAL, PY_EXEC, PY_NE_NONE, PY_OPEN,
    PY_REQUESTS_CALL, PY_TYPE_CHECK, PY_WILDCARD_IMPORT,
};
use crate::rules::results::{Issue, IssueKind};
use crate::rules::source::LineView;

/// Window after a `cursor.execute` searched for a commit
const COMMIT_WINDOW: usize = 500;
/// Window after a connection searched for a close
const CONNECTION_WINDOW: usize = 500;
/// Window after an `open(` searched for a close
const FILE_WINDOW: usize = 300;
/// Window before a `return` searched for a Flask decorator
const ROUTE_WINDOW: usize = 1000;
/// Window after a `try:` searched for a swallowed exception
const HANDLER_WINDOW: usize = 500;
/// Window before a `+=` searched for a loop header
const LOOP_WINDOW: usize = 100;

/// Line battery for Python sources
pub struct PythonRules;

impl LineRules for PythonRules {
    fn name(&self) -> &'static str {
        "python"
    }

    fn check(&self, line: &LineView<'_>, options: &RuleOptions, issues: &mut Vec<Issue>) {
        let text = line.text;
        let stripped = line.trimmed();
        let lower = text.to_lowercase();
        let code = code_portion(text);
        let deep = options.deep_heuristics;

        let mut report = |kind: IssueKind, message: &str| {
            issues.push(Issue::new(kind, message, line.number));
        };

        // Dynamic execution and secrets
        if PY_EVAL.is_match(text) {
            report(IssueKind::SecurityIssue, "Avoid using eval() - security risk");
        }
        if PY_EXEC.is_match(text) {
            report(IssueKind::SecurityIssue, "Avoid using exec() - security risk");
        }
        if text.contains("pickle.load(") || text.contains("pickle.loads(") {
            report(
                IssueKind::SecurityIssue,
                "Pickle can execute arbitrary code - use json instead",
            );
        }
        if text.contains("shell=True") {
            report(
                IssueKind::SecurityIssue,
                "shell=True is a security risk - avoid if possible",
            );
        }
        if lower.contains("password") && (text.contains("print(") || lower.contains("log")) {
            report(IssueKind::SecurityIssue, "Potential password logging detected");
        }
        if lower.contains("api_key") && text.contains('=') && text.contains('"') {
            report(IssueKind::SecurityIssue, "Hardcoded API key detected");
        }
        if text.contains("TODO") || text.contains("FIXME") || text.contains("HACK") {
            report(
                IssueKind::CodeQuality,
                "TODO/FIXME comment found - needs implementation",
            );
        }

        // Injection and transport
        if text.contains(".execute(") && text.contains("f\"") {
            report(
                IssueKind::SecurityIssue,
                "SQL injection risk - use parameterized queries",
            );
        }
        if text.contains(".execute(") && text.contains('%') && !text.contains("format") {
            report(
                IssueKind::SecurityIssue,
                "SQL injection risk - use parameterized queries",
            );
        }
        if PY_REQUESTS_CALL.is_match(text) && text.contains("verify=False") {
            report(
                IssueKind::SecurityIssue,
                "SSL verification disabled - security risk",
            );
        }
        if text.contains("sleep(") {
            report(
                IssueKind::PerformanceIssue,
                "sleep() call may block - consider async approach",
            );
        }

        // Resources
        if deep
            && text.contains("cursor.execute")
            && !line.window_after(COMMIT_WINDOW).contains("commit")
        {
            report(
                IssueKind::DatabaseIssue,
                "Missing commit() after execute() - transaction may not persist",
            );
        }
        if deep
            && (text.contains("connect(") || text.contains("Connection("))
            && !stripped.starts_with("with ")
            && !line.window_after(CONNECTION_WINDOW).contains(".close()")
        {
            report(
                IssueKind::ResourceLeak,
                "Database connection not closed - use context manager",
            );
        }
        if deep
            && PY_OPEN.is_match(text)
            && !stripped.starts_with("with")
            && !line.window_after(FILE_WINDOW).contains(".close()")
        {
            report(IssueKind::ResourceLeak, "File not closed - use \"with\" statement");
        }

        // Web routes
        if (text.contains("@app.route") || text.contains("@router"))
            && !text.contains("methods=")
            && !lower.contains("get")
            && !lower.contains("post")
        {
            report(IssueKind::APIIssue, "HTTP method not specified for route");
        }
        if deep
            && stripped.starts_with("return ")
            && !text.contains("jsonify")
            && (text.contains('{') || text.contains("dict"))
            && line.window_before(ROUTE_WINDOW).contains("@app")
        {
            report(
                IssueKind::APIIssue,
                "Return dict without jsonify() in Flask route",
            );
        }

        // Error handling
        if deep && stripped.contains("try:") {
            let window = line.window_after(HANDLER_WINDOW);
            if window.contains("except Exception:") && window.contains("pass") {
                report(
                    IssueKind::ErrorHandling,
                    "Empty exception handler - errors silently ignored",
                );
            }
        }
        if text.contains("raise Exception(") {
            report(
                IssueKind::ErrorHandling,
                "Generic Exception raised - use specific exception type",
            );
        }

        // Comparisons and signatures
        if PY_EQ_NONE.is_match(code) {
            report(IssueKind::ComparisonBug, "Use 'is None' instead of '== None'");
        }
        if PY_NE_NONE.is_match(code) {
            report(
                IssueKind::ComparisonBug,
                "Use 'is not None' instead of '!= None'",
            );
        }
        if PY_BARE_EXCEPT.is_match(text) {
            report(
                IssueKind::BareExcept,
                "Bare except clause - specify exception type",
            );
        }
        if is_def(stripped) {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.contains("=[]") {
                report(
                    IssueKind::MutableDefault,
                    "Mutable default argument [] - use None instead",
                );
            }
            if compact.contains("={}") {
                report(
                    IssueKind::MutableDefault,
                    "Mutable default argument {} - use None instead",
                );
            }
        }
        if PY_TYPE_CHECK.is_match(code) {
            report(IssueKind::TypeCheckBug, "Use isinstance() instead of type() ==");
        }
        if PY_ASSIGN_IN_IF.is_match(code) && !code.contains(":=") {
            report(
                IssueKind::AssignmentInCondition,
                "Assignment in condition - did you mean == ?",
            );
        }
        if PY_WILDCARD_IMPORT.is_match(code) {
            report(
                IssueKind::ImportIssue,
                "Avoid wildcard imports - import specific names",
            );
        }
        if deep
            && text.contains("+=")
            && lower.contains("str")
            && line.window_before(LOOP_WINDOW).contains("for ")
        {
            report(
                IssueKind::PerformanceIssue,
                "String concatenation in loop - use join() instead",
            );
        }

        check_trailing_whitespace(line, issues);
    }
}

/// Whether a stripped line opens a function definition
pub(crate) fn is_def(stripped: &str) -> bool {
    stripped.starts_with("def ") || stripped.starts_with("async def ")
}

/// The part of a line before its comment, ignoring `#` inside string literals
pub(crate) fn code_portion(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => return &line[..i],
            _ => {}
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::categories::test_support::{check_line, kinds};
    use crate::rules::source::SourceLines;

    fn check(text: &str) -> Vec<IssueKind> {
        kinds(&check_line(&PythonRules, text))
    }

    fn check_document(content: &str, deep: bool) -> Vec<Issue> {
        let options = RuleOptions {
            deep_heuristics: deep,
        };
        let mut issues = Vec::new();
        for line in SourceLines::new(content).iter() {
            PythonRules.check(&line, &options, &mut issues);
        }
        issues
    }

    #[test]
    fn test_dynamic_execution() {
        assert_eq!(check("result = eval(user_input)"), vec![IssueKind::SecurityIssue]);
        assert_eq!(check("exec(code)"), vec![IssueKind::SecurityIssue]);
        assert!(check("value = evaluate(x)").is_empty());
        assert_eq!(
            check("data = pickle.loads(blob)"),
            vec![IssueKind::SecurityIssue]
        );
    }

    #[test]
    fn test_multiple_predicates_fire_in_order() {
        let issues = check_line(&PythonRules, "x = eval(s) == None ");
        assert_eq!(
            kinds(&issues),
            vec![
                IssueKind::SecurityIssue,
                IssueKind::ComparisonBug,
                IssueKind::StyleIssue
            ]
        );
        assert!(issues.iter().all(|i| i.line == 1));
    }

    #[test]
    fn test_none_comparisons() {
        assert_eq!(check("if x == None:"), vec![IssueKind::ComparisonBug]);
        assert_eq!(check("if x != None:"), vec![IssueKind::ComparisonBug]);
        assert!(check("if x is None:").is_empty());
        assert!(check("y = 1  # compare == None later").is_empty());
        assert_eq!(
            check("if s == None and t == '#':"),
            vec![IssueKind::ComparisonBug]
        );
    }

    #[test]
    fn test_bare_except_and_mutable_defaults() {
        assert_eq!(check("    except:"), vec![IssueKind::BareExcept]);
        assert!(check("    except ValueError:").is_empty());
        assert_eq!(check("def f(a=[]):"), vec![IssueKind::MutableDefault]);
        assert_eq!(
            check("def f(a = [], b = {}):"),
            vec![IssueKind::MutableDefault, IssueKind::MutableDefault]
        );
        assert!(check("x = []").is_empty());
    }

    #[test]
    fn test_type_check_and_imports() {
        assert_eq!(check("if type(x) == int:"), vec![IssueKind::TypeCheckBug]);
        assert_eq!(check("from os import *"), vec![IssueKind::ImportIssue]);
    }

    #[test]
    fn test_requests_verify() {
        assert_eq!(
            check("r = requests.post(url, verify=False)"),
            vec![IssueKind::SecurityIssue]
        );
        assert!(check("r = requests.post(url, verify=True)").is_empty());
    }

    #[test]
    fn test_route_without_methods() {
        assert_eq!(check("@app.route('/items')"), vec![IssueKind::APIIssue]);
        assert!(check("@app.route('/items', methods=['POST'])").is_empty());
    }

    #[test]
    fn test_open_without_close() {
        let issues = check_document("f = open('a.txt')\ndata = f.read()\n", true);
        assert_eq!(kinds(&issues), vec![IssueKind::ResourceLeak]);
        assert_eq!(issues[0].line, 1);

        let closed = check_document("f = open('a.txt')\ndata = f.read()\nf.close()\n", true);
        assert!(closed.is_empty());

        let with_block = check_document("with open('a.txt') as f:\n    f.read()\n", true);
        assert!(with_block.is_empty());
    }

    #[test]
    fn test_deep_heuristics_can_be_disabled() {
        let content = "f = open('a.txt')\ncursor.execute('SELECT 1')\n";
        assert_eq!(check_document(content, true).len(), 2);
        assert!(check_document(content, false).is_empty());
    }

    #[test]
    fn test_missing_commit() {
        let issues = check_document("cursor.execute('DELETE FROM t')\n", true);
        assert_eq!(kinds(&issues), vec![IssueKind::DatabaseIssue]);

        let committed = check_document("cursor.execute('DELETE FROM t')\nconn.commit()\n", true);
        assert!(committed.is_empty());
    }

    #[test]
    fn test_return_dict_in_route() {
        let content = "@app.route('/x', methods=['GET'])\ndef x():\n    return {'ok': True}\n";
        let issues = check_document(content, true);
        assert_eq!(kinds(&issues), vec![IssueKind::APIIssue]);
        assert_eq!(issues[0].line, 3);
    }

    #[test]
    fn test_swallowed_exception() {
        let content = "try:\n    run()\nexcept Exception:\n    pass\n";
        let issues = check_document(content, true);
        assert_eq!(kinds(&issues), vec![IssueKind::ErrorHandling]);
        assert_eq!(issues[0].line, 1);
    }

    #[test]
    fn test_string_concatenation_in_loop() {
        let content = "for item in items:\n    out += str(item)\n";
        let issues = check_document(content, true);
        assert_eq!(kinds(&issues), vec![IssueKind::PerformanceIssue]);
        assert_eq!(issues[0].line, 2);
    }

    #[test]
    fn test_code_portion() {
        assert_eq!(code_portion("x = 1  # note"), "x = 1  ");
        assert_eq!(code_portion("s = '#not a comment'"), "s = '#not a comment'");
        assert_eq!(code_portion(r##"s = "a\"#" # c"##), r##"s = "a\"#" "##);
        assert_eq!(code_portion("plain"), "plain");
    }

    #[test]
    fn test_is_def() {
        assert!(is_def("def f():"));
        assert!(is_def("async def f():"));
        assert!(!is_def("define = 1"));
    }
}
