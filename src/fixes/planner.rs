//! Rewrite planner - Maps issues to line rewrites
//!
//! Every issue kind has at most one deterministic rewrite. Planning reads the
//! current state of the file's lines, so several issues on one line compose,
//! and a rewrite that has already happened plans to nothing.

use regex::Captures;
use std::collections::HashSet;

use super::plan::Rewrite;
use crate::rules::categories::python::{code_portion, is_def};
use crate::rules::categories::script::loose_operators;
use crate::rules::patterns::{
    CSS_IMPORTANT, HTML_ALT, HTML_DEPRECATED_TAG, HTML_IMG, JS_ASSIGN_IN_IF, JS_CONSOLE_LOG,
    JS_EVAL, JS_INNER_HTML, JS_REJECT_UNAUTHORIZED, JS_VAR, PY_ASSIGN_IN_IF, PY_BARE_EXCEPT,
    PY_CURSOR_EXECUTE, PY_EVAL, PY_EXEC, PY_FLASK_WILDCARD, PY_JSONIFY_IMPORT,
    PY_LITERAL_COMPARISON, PY_LOGGING_IMPORT, PY_MUTABLE_DEFAULT, PY_OPEN_ASSIGN,
    PY_RAISE_EXCEPTION, PY_RETURN_DICT, PY_ROUTE_DECORATOR, PY_TYPE_CHECK, PY_WILDCARD_IMPORT,
    TRAILING_WHITESPACE,
};
use crate::rules::results::{Issue, IssueKind};
use crate::rules::source::indentation;
use crate::rules::syntax::PythonTree;
use crate::scanner::Language;

/// One level of Python block indentation
const BODY_INDENT: &str = "    ";

/// How far below a `def` the planner looks for its `pass`
const EMPTY_BODY_LOOKAHEAD: usize = 20;

const NOT_IMPLEMENTED: &str = "raise NotImplementedError()";

/// Plan the rewrites for one issue
///
/// # Arguments
///
/// * `issue` - The issue to fix
/// * `language` - Language of the file
/// * `lines` - Current text of every line, indexed by original line number - 1
///
/// # Returns
///
/// The rewrites to apply, empty when the kind has no rewrite or the line
/// no longer needs one
pub fn plan(issue: &Issue, language: Language, lines: &[String]) -> Vec<Rewrite> {
    if issue.kind == IssueKind::MissingLogging {
        return plan_logging(language);
    }

    let line = issue.line;
    let Some(text) = line.checked_sub(1).and_then(|i| lines.get(i)) else {
        return Vec::new();
    };
    let text = text.as_str();

    if issue.kind != IssueKind::StyleIssue && is_commented(text, language) {
        return Vec::new();
    }

    let mut rewrites = plan_line(issue, language, lines, text);

    // A block whose only statement was commented out still needs a body
    let comments_out_line = rewrites.iter().any(|r| match r {
        Rewrite::Replace { line: l, text: new } => *l == line && is_commented(new, language),
        _ => false,
    });
    if language == Language::Python && comments_out_line && is_sole_statement(line, lines) {
        rewrites.push(Rewrite::insert_after(line, format!("{}pass", indentation(text))));
    }
    rewrites
}

fn plan_line(issue: &Issue, language: Language, lines: &[String], text: &str) -> Vec<Rewrite> {
    let line = issue.line;
    match issue.kind {
        IssueKind::ComparisonBug => replace_if_changed(line, text, fix_comparison(text, language)),
        IssueKind::BareExcept => replace_if_changed(
            line,
            text,
            Some(PY_BARE_EXCEPT.replace(text, "${1}except Exception:").into_owned()),
        ),
        IssueKind::MutableDefault => plan_mutable_default(line, text),
        IssueKind::TypeCheckBug => replace_if_changed(
            line,
            text,
            Some(in_code(text, |code| {
                PY_TYPE_CHECK
                    .replace_all(code, "isinstance(${1}, ${2})")
                    .into_owned()
            })),
        ),
        IssueKind::ImportIssue => replace_if_changed(line, text, fix_import(text)),
        IssueKind::SecurityIssue => replace_if_changed(line, text, fix_security(issue, text, language)),
        IssueKind::CodeQuality => replace_if_changed(line, text, fix_code_quality(text, language)),
        IssueKind::DeprecatedCode => {
            replace_if_changed(line, text, fix_deprecated(text, language))
        }
        IssueKind::Accessibility => {
            let fixed = (language == Language::Html && !HTML_ALT.is_match(text))
                .then(|| HTML_IMG.replace_all(text, r#"${1} alt="""#).into_owned());
            replace_if_changed(line, text, fixed)
        }
        IssueKind::StyleIssue => replace_if_changed(
            line,
            text,
            Some(TRAILING_WHITESPACE.replace(text, "").into_owned()),
        ),
        IssueKind::AssignmentInCondition => {
            replace_if_changed(line, text, fix_assignment(text, language))
        }
        IssueKind::EmptyFunction => plan_empty_function(line, lines),
        IssueKind::PerformanceIssue => {
            let note = if text.contains("sleep(") {
                "TODO: Use async/await"
            } else {
                "TODO: Use join()"
            };
            replace_if_changed(line, text, comment_out(text, language, Some(note)))
        }
        IssueKind::DuplicateException => plan_duplicate_handler(line, lines, language),
        IssueKind::ResourceLeak => plan_resource_leak(line, lines, language),
        IssueKind::DatabaseIssue => plan_commit(line, text),
        IssueKind::APIIssue => plan_api(line, text),
        IssueKind::ErrorHandling => replace_if_changed(
            line,
            text,
            Some(
                PY_RAISE_EXCEPTION
                    .replace_all(text, "raise ValueError(")
                    .into_owned(),
            ),
        ),
        IssueKind::LongFunction => vec![Rewrite::insert_after(
            line,
            format!(
                "{}{}# TODO: Refactor - function too long, split into smaller functions",
                indentation(text),
                BODY_INDENT
            ),
        )],
        IssueKind::MissingErrorHandling => vec![Rewrite::insert_after(
            line,
            format!(
                "{}{}# TODO: Add try-except error handling",
                indentation(text),
                BODY_INDENT
            ),
        )],
        IssueKind::MissingLogging
        | IssueKind::SyntaxError
        | IssueKind::FileError
        | IssueKind::AnalysisError => Vec::new(),
    }
}

/// Whether `line` is the only statement of the block it sits in
fn is_sole_statement(line: usize, lines: &[String]) -> bool {
    let indent = indentation(&lines[line - 1]).len();
    let is_code = |text: &&String| {
        let trimmed = text.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    };

    let opens_block = lines[..line - 1]
        .iter()
        .rev()
        .find(is_code)
        .map_or(false, |prev| {
            indentation(prev).len() < indent && code_portion(prev).trim_end().ends_with(':')
        });
    let block_continues = lines[line..]
        .iter()
        .find(is_code)
        .map_or(false, |next| indentation(next).len() >= indent);

    opens_block && !block_continues
}

fn replace_if_changed(line: usize, old: &str, new: Option<String>) -> Vec<Rewrite> {
    match new {
        Some(new) if new != old => vec![Rewrite::replace(line, new)],
        _ => Vec::new(),
    }
}

fn is_commented(text: &str, language: Language) -> bool {
    let trimmed = text.trim_start();
    language
        .comment_prefixes()
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// Turn a line into a comment, keeping its indentation
fn comment_out(text: &str, language: Language, note: Option<&str>) -> Option<String> {
    if is_commented(text, language) {
        return None;
    }
    let indent = indentation(text);
    let stripped = text.trim();

    let commented = match language {
        Language::Python => match note {
            Some(note) => format!("{}# {}  # {}", indent, stripped, note),
            None => format!("{}# {}", indent, stripped),
        },
        Language::JavaScript => match note {
            Some(note) => format!("{}// {}  // {}", indent, stripped, note),
            None => format!("{}// {}", indent, stripped),
        },
        Language::Html => format!("{}<!-- {} -->", indent, stripped),
        Language::Stylesheet | Language::Other => format!("{}/* {} */", indent, stripped),
    };
    Some(commented)
}

/// Apply `f` to the code part of a Python line, leaving its comment alone
fn in_code(text: &str, f: impl FnOnce(&str) -> String) -> String {
    let code = code_portion(text);
    format!("{}{}", f(code), &text[code.len()..])
}

fn fix_comparison(text: &str, language: Language) -> Option<String> {
    match language {
        Language::Python => Some(in_code(text, |code| {
            PY_LITERAL_COMPARISON
                .replace_all(code, |caps: &Captures| {
                    let op = if &caps[1] == "==" { "is" } else { "is not" };
                    format!(" {} {}", op, &caps[2])
                })
                .into_owned()
        })),
        Language::JavaScript => {
            let operators = loose_operators(text);
            if operators.is_empty() {
                return None;
            }
            let mut fixed = text.to_string();
            for (offset, _) in operators.iter().rev() {
                fixed.insert(offset + 1, '=');
            }
            Some(fixed)
        }
        _ => None,
    }
}

fn fix_import(text: &str) -> Option<String> {
    if let Some(caps) = PY_FLASK_WILDCARD.captures(text) {
        return Some(format!(
            "{}from flask import Flask, request, jsonify, render_template",
            &caps[1]
        ));
    }
    if PY_WILDCARD_IMPORT.is_match(code_portion(text)) {
        return comment_out(text, Language::Python, Some("TODO: Replace wildcard import"));
    }
    None
}

fn fix_security(issue: &Issue, text: &str, language: Language) -> Option<String> {
    let lower = text.to_lowercase();
    let sql = issue.message.contains("SQL injection");

    match language {
        Language::Python => {
            if PY_EVAL.is_match(text) {
                comment_out(text, language, Some("SECURITY: Use ast.literal_eval()"))
            } else if PY_EXEC.is_match(text) {
                comment_out(text, language, Some("SECURITY: Refactor"))
            } else if text.contains("shell=True") {
                Some(text.replace("shell=True", "shell=False"))
            } else if text.contains("pickle.load") {
                comment_out(text, language, Some("SECURITY: Use json"))
            } else if text.contains("verify=False") {
                Some(text.replace("verify=False", "verify=True"))
            } else if sql {
                comment_out(text, language, Some("SECURITY: Use parameterized queries"))
            } else if lower.contains("password") {
                comment_out(text, language, Some("SECURITY: Remove password logging"))
            } else if lower.contains("api_key") {
                comment_out(
                    text,
                    language,
                    Some("SECURITY: Move to environment variable"),
                )
            } else {
                None
            }
        }
        Language::JavaScript => {
            if JS_EVAL.is_match(text) {
                comment_out(text, language, Some("SECURITY: Remove eval()"))
            } else if JS_INNER_HTML.is_match(text) {
                Some(text.replace("innerHTML", "textContent"))
            } else if JS_REJECT_UNAUTHORIZED.is_match(text) {
                Some(
                    JS_REJECT_UNAUTHORIZED
                        .replace_all(text, "rejectUnauthorized: true")
                        .into_owned(),
                )
            } else if sql {
                comment_out(text, language, Some("SECURITY: Use parameterized queries"))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn fix_code_quality(text: &str, language: Language) -> Option<String> {
    match language {
        Language::JavaScript if JS_CONSOLE_LOG.is_match(text) => comment_out(text, language, None),
        Language::Stylesheet if text.contains("!important") => {
            Some(CSS_IMPORTANT.replace_all(text, "").into_owned())
        }
        // TODO markers and inline styles need a human
        _ => None,
    }
}

fn fix_deprecated(text: &str, language: Language) -> Option<String> {
    match language {
        Language::JavaScript => Some(JS_VAR.replace_all(text, "let ").into_owned()),
        Language::Html if HTML_DEPRECATED_TAG.is_match(text) => comment_out(text, language, None),
        _ => None,
    }
}

fn fix_assignment(text: &str, language: Language) -> Option<String> {
    match language {
        Language::Python if !code_portion(text).contains(":=") => Some(in_code(text, |code| {
            PY_ASSIGN_IN_IF
                .replace(code, "${1} ${2} == ${3}")
                .into_owned()
        })),
        Language::JavaScript => Some(
            JS_ASSIGN_IN_IF
                .replace(text, "if (${1} === ${2}")
                .into_owned(),
        ),
        _ => None,
    }
}

/// `=[]` / `={}` defaults become `=None`, with the empty value rebuilt in the body
fn plan_mutable_default(line: usize, text: &str) -> Vec<Rewrite> {
    if !is_def(text.trim()) {
        return Vec::new();
    }

    let mut params: Vec<(String, &'static str)> = Vec::new();
    let fixed = in_code(text, |code| {
        PY_MUTABLE_DEFAULT
            .replace_all(code, |caps: &Captures| {
                let empty = if caps[3].starts_with('[') { "[]" } else { "{}" };
                params.push((caps[1].to_string(), empty));
                format!(
                    "{}{}=None",
                    &caps[1],
                    caps.get(2).map_or("", |m| m.as_str())
                )
            })
            .into_owned()
    });
    if params.is_empty() {
        return Vec::new();
    }

    let mut rewrites = vec![Rewrite::replace(line, fixed)];

    // Only single-line signatures get the body guard
    if code_portion(text).trim_end().ends_with(':') {
        let body = format!("{}{}", indentation(text), BODY_INDENT);
        let mut guard = Vec::new();
        for (name, empty) in params {
            guard.push(format!("{}if {} is None:", body, name));
            guard.push(format!("{}{}{} = {}", body, BODY_INDENT, name, empty));
        }
        rewrites.push(Rewrite::InsertAfter { line, lines: guard });
    }

    rewrites
}

/// The `pass` of an empty function becomes `raise NotImplementedError()`
fn plan_empty_function(line: usize, lines: &[String]) -> Vec<Rewrite> {
    let def_text = &lines[line - 1];
    if let Some(index) = trailing_pass(def_text) {
        if def_text[..index].trim_end().ends_with(':') {
            return vec![Rewrite::replace(line, swap_pass(def_text, index))];
        }
    }

    let last = lines.len().min(line + EMPTY_BODY_LOOKAHEAD);
    (line + 1..=last)
        .find_map(|n| {
            let text = &lines[n - 1];
            trailing_pass(text)
                .filter(|&index| text[..index].trim().is_empty())
                .map(|index| vec![Rewrite::replace(n, swap_pass(text, index))])
        })
        .unwrap_or_default()
}

/// Offset of a `pass` ending the code part of a line
fn trailing_pass(text: &str) -> Option<usize> {
    let code = code_portion(text).trim_end();
    let index = code.strip_suffix("pass")?.len();
    let word_start = code[..index]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric() && c != '_');
    word_start.then_some(index)
}

fn swap_pass(text: &str, index: usize) -> String {
    format!(
        "{}{}{}",
        &text[..index],
        NOT_IMPLEMENTED,
        &text[index + "pass".len()..]
    )
}

/// Line numbers of the non-blank lines indented at least `min_indent` below
/// `line`; lines in `opaque` are neither part of the body nor end it
fn indented_body(
    line: usize,
    lines: &[String],
    min_indent: usize,
    opaque: &HashSet<usize>,
) -> Vec<usize> {
    let mut body = Vec::new();
    for n in line + 1..=lines.len() {
        let text = &lines[n - 1];
        if text.trim().is_empty() || opaque.contains(&n) {
            continue;
        }
        if indentation(text).len() < min_indent {
            break;
        }
        body.push(n);
    }
    body
}

/// Comment out a repeated `except` clause together with its body
fn plan_duplicate_handler(line: usize, lines: &[String], language: Language) -> Vec<Rewrite> {
    let header = &lines[line - 1];
    let Some(commented) = comment_out(header, language, Some("Duplicate")) else {
        return Vec::new();
    };

    let mut rewrites = vec![Rewrite::replace(line, commented)];
    let body_indent = indentation(header).len() + 1;
    for n in indented_body(line, lines, body_indent, &HashSet::new()) {
        if let Some(body) = comment_out(&lines[n - 1], language, None) {
            rewrites.push(Rewrite::replace(n, body));
        }
    }
    rewrites
}

/// `f = open(...)` becomes a `with` block around the rest of its block
fn plan_resource_leak(line: usize, lines: &[String], language: Language) -> Vec<Rewrite> {
    let text = &lines[line - 1];

    if let Some(caps) = PY_OPEN_ASSIGN.captures(text) {
        // Continuation lines of multi-line strings keep their exact text
        let Some(in_strings) = string_continuations(lines) else {
            return Vec::new();
        };
        let indent = &caps[1];
        let body = indented_body(line, lines, indent.len(), &in_strings);
        // A with statement needs a body
        if body.is_empty() {
            return Vec::new();
        }

        let mut rewrites = vec![Rewrite::replace(
            line,
            format!("{}with open({}) as {}:", indent, &caps[3], &caps[2]),
        )];
        rewrites.extend(
            body.into_iter()
                .map(|n| Rewrite::replace(n, format!("{}{}", BODY_INDENT, lines[n - 1]))),
        );
        return rewrites;
    }

    if text.contains("connect(") || text.contains("Connection(") {
        return replace_if_changed(
            line,
            text,
            comment_out(text, language, Some("TODO: Use context manager or close()")),
        );
    }

    Vec::new()
}

fn string_continuations(lines: &[String]) -> Option<HashSet<usize>> {
    let source = lines.join("\n");
    let tree = PythonTree::parse(&source).ok()?;
    if tree.syntax_error().is_some() {
        return None;
    }
    Some(tree.string_continuation_lines())
}

/// Insert a commit on the connection behind the executing cursor, reached
/// through the full receiver expression
fn plan_commit(line: usize, text: &str) -> Vec<Rewrite> {
    let balanced = text.matches('(').count() == text.matches(')').count();
    match PY_CURSOR_EXECUTE.captures(text) {
        Some(caps) if balanced => vec![Rewrite::insert_after(
            line,
            format!(
                "{}{}.connection.commit()  # Auto-added",
                indentation(text),
                &caps[1]
            ),
        )],
        _ => Vec::new(),
    }
}

fn plan_api(line: usize, text: &str) -> Vec<Rewrite> {
    if PY_ROUTE_DECORATOR.is_match(text) && !text.contains("methods=") {
        let fixed = text
            .rfind(')')
            .map(|pos| format!("{}, methods=[\"GET\", \"POST\"]{}", &text[..pos], &text[pos..]));
        return replace_if_changed(line, text, fixed);
    }

    if text.contains("jsonify") {
        return Vec::new();
    }
    match PY_RETURN_DICT.captures(text) {
        Some(caps) => vec![
            Rewrite::replace(line, format!("{}return jsonify({})", &caps[1], &caps[2])),
            Rewrite::Prepend {
                lines: vec!["from flask import jsonify".to_string()],
                guard: &PY_JSONIFY_IMPORT,
            },
        ],
        None => Vec::new(),
    }
}

fn plan_logging(language: Language) -> Vec<Rewrite> {
    if language != Language::Python {
        return Vec::new();
    }
    vec![Rewrite::Prepend {
        lines: vec![
            "import logging".to_string(),
            "logger = logging.getLogger(__name__)".to_string(),
        ],
        guard: &PY_LOGGING_IMPORT,
    }]
}
