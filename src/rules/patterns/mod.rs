//! Compiled patterns shared by the detector and the patch planner
//!
//! Detection and rewriting must agree on what a construct looks like, so both
//! sides match against the same compiled expressions.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Python

    pub static ref PY_EVAL: Regex = Regex::new(r"\beval\(").unwrap();
    pub static ref PY_EXEC: Regex = Regex::new(r"\bexec\(").unwrap();
    pub static ref PY_OPEN: Regex = Regex::new(r"\bopen\(").unwrap();
    pub static ref PY_REQUESTS_CALL: Regex = Regex::new(r"\brequests\.\w+\(").unwrap();
    pub static ref PY_EQ_NONE: Regex = Regex::new(r"==\s*None\b").unwrap();
    pub static ref PY_NE_NONE: Regex = Regex::new(r"!=\s*None\b").unwrap();
    pub static ref PY_BARE_EXCEPT: Regex = Regex::new(r"^(\s*)except\s*:").unwrap();
    pub static ref PY_LITERAL_COMPARISON: Regex =
        Regex::new(r"\s*(==|!=)\s*(None|True|False)\b").unwrap();
    pub static ref PY_MUTABLE_DEFAULT: Regex =
        Regex::new(r"(\w+)(\s*:[^=,()]*?)?\s*=\s*(\[\s*\]|\{\s*\})").unwrap();
    pub static ref PY_TYPE_CHECK: Regex =
        Regex::new(r"\btype\(([^()]+)\)\s*==\s*([\w.]+)").unwrap();
    pub static ref PY_ASSIGN_IN_IF: Regex =
        Regex::new(r"\b(if|elif|while)\s+([\w.]+)\s*=\s*([^=\s])").unwrap();
    pub static ref PY_WILDCARD_IMPORT: Regex = Regex::new(r"\bimport\s+\*").unwrap();
    pub static ref PY_FLASK_WILDCARD: Regex =
        Regex::new(r"^(\s*)from\s+flask\s+import\s+\*\s*$").unwrap();
    pub static ref PY_OPEN_ASSIGN: Regex =
        Regex::new(r"^(\s*)(\w+)\s*=\s*open\(([^()]*(?:\([^()]*\)[^()]*)*)\)\s*$").unwrap();
    pub static ref PY_CURSOR_EXECUTE: Regex =
        Regex::new(r"\b(\w+(?:\.\w+)*)\.execute\(").unwrap();
    pub static ref PY_ROUTE_DECORATOR: Regex = Regex::new(r"^\s*@\w+\.route\(").unwrap();
    pub static ref PY_RETURN_DICT: Regex = Regex::new(r"^(\s*)return\s+(\{.*\})\s*$").unwrap();
    pub static ref PY_RAISE_EXCEPTION: Regex = Regex::new(r"\braise\s+Exception\(").unwrap();
    pub static ref PY_LOGGING_IMPORT: Regex =
        Regex::new(r"(?m)^\s*(import\s+logging\b|from\s+logging\s+import\b)").unwrap();
    pub static ref PY_JSONIFY_IMPORT: Regex =
        Regex::new(r"(?m)^\s*from\s+flask\s+import\s+.*\bjsonify\b").unwrap();
    pub static ref PY_PREAMBLE: Regex =
        Regex::new(r"^(#!|#.*coding[:=])").unwrap();

    // JavaScript / TypeScript

    pub static ref JS_EVAL: Regex = Regex::new(r"\beval\(").unwrap();
    pub static ref JS_INNER_HTML: Regex = Regex::new(r"\binnerHTML\s*\+?=[^=]").unwrap();
    pub static ref JS_VAR: Regex = Regex::new(r"\bvar\s").unwrap();
    pub static ref JS_CONSOLE_LOG: Regex = Regex::new(r"\bconsole\.log\(").unwrap();
    pub static ref JS_REJECT_UNAUTHORIZED: Regex =
        Regex::new(r"rejectUnauthorized\s*:\s*false\b").unwrap();
    pub static ref JS_TEMPLATE_QUERY: Regex =
        Regex::new(r"\.(query|execute)\(\s*`[^`]*\$\{").unwrap();
    pub static ref JS_ASSIGN_IN_IF: Regex =
        Regex::new(r"\bif\s*\(\s*([\w.]+)\s*=\s*([^=>\s])").unwrap();

    // HTML

    pub static ref HTML_IMG: Regex = Regex::new(r"(?i)(<img)\b").unwrap();
    pub static ref HTML_ALT: Regex = Regex::new(r"(?i)\balt\s*=").unwrap();
    pub static ref HTML_INLINE_STYLE: Regex = Regex::new(r"(?i)\bstyle\s*=").unwrap();
    pub static ref HTML_STYLE_TAG: Regex = Regex::new(r"(?i)<style\b").unwrap();
    pub static ref HTML_DEPRECATED_TAG: Regex = Regex::new(r"(?i)<(font|center)\b").unwrap();

    // Stylesheets

    pub static ref CSS_IMPORTANT: Regex = Regex::new(r"\s*!important").unwrap();
    pub static ref CSS_SHORT_HEX: Regex =
        Regex::new(r":[^;{}]*?#([0-9a-fA-F]{3})\b").unwrap();

    // Any language

    pub static ref TRAILING_WHITESPACE: Regex = Regex::new(r"[ \t]+$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_comparison_patterns() {
        assert!(PY_EQ_NONE.is_match("if x == None:"));
        assert!(PY_EQ_NONE.is_match("if x ==None:"));
        assert!(!PY_EQ_NONE.is_match("if x == NoneType:"));
        assert!(PY_NE_NONE.is_match("while y != None:"));
        let fixed = PY_LITERAL_COMPARISON.replace_all("if a==None or b != True:", |c: &regex::Captures| {
            format!(" {} {}", if &c[1] == "==" { "is" } else { "is not" }, &c[2])
        });
        assert_eq!(fixed, "if a is None or b is not True:");
    }

    #[test]
    fn test_mutable_default_captures() {
        let line = "def f(a, items=[], opts: dict = {}):";
        let caps: Vec<_> = PY_MUTABLE_DEFAULT.captures_iter(line).collect();
        assert_eq!(caps.len(), 2);
        assert_eq!(&caps[0][1], "items");
        assert_eq!(&caps[0][3], "[]");
        assert_eq!(&caps[1][1], "opts");
        assert_eq!(caps[1].get(2).map(|m| m.as_str()), Some(": dict"));
    }

    #[test]
    fn test_type_check_captures() {
        let caps = PY_TYPE_CHECK.captures("if type(value) == str:").unwrap();
        assert_eq!(&caps[1], "value");
        assert_eq!(&caps[2], "str");
        assert!(!PY_TYPE_CHECK.is_match("if type(f(x)) == str:"));
    }

    #[test]
    fn test_cursor_receiver_keeps_attribute_path() {
        let caps = PY_CURSOR_EXECUTE
            .captures("        self.db.cursor.execute('DELETE FROM t')")
            .unwrap();
        assert_eq!(&caps[1], "self.db.cursor");
        assert_eq!(&PY_CURSOR_EXECUTE.captures("cur.execute(q)").unwrap()[1], "cur");
    }

    #[test]
    fn test_open_assignment() {
        let caps = PY_OPEN_ASSIGN.captures("    f = open('data.txt', 'r')").unwrap();
        assert_eq!(&caps[1], "    ");
        assert_eq!(&caps[2], "f");
        assert_eq!(&caps[3], "'data.txt', 'r'");
        assert!(!PY_OPEN_ASSIGN.is_match("data = open('x').read()"));
        let nested = PY_OPEN_ASSIGN
            .captures("fh = open(os.path.join(base, name), 'w')")
            .unwrap();
        assert_eq!(&nested[3], "os.path.join(base, name), 'w'");
    }

    #[test]
    fn test_assignment_in_condition() {
        assert!(PY_ASSIGN_IN_IF.is_match("if x = 5:"));
        assert!(!PY_ASSIGN_IN_IF.is_match("if x == 5:"));
        assert!(!PY_ASSIGN_IN_IF.is_match("if (x := 5):"));
        assert!(JS_ASSIGN_IN_IF.is_match("if (user.id = 3) {"));
        assert!(!JS_ASSIGN_IN_IF.is_match("if (a === b) {"));
        assert!(!JS_ASSIGN_IN_IF.is_match("if (a => b) {"));
    }

    #[test]
    fn test_web_patterns() {
        assert!(JS_INNER_HTML.is_match("el.innerHTML = data;"));
        assert!(!JS_INNER_HTML.is_match("if (el.innerHTML == x) {}"));
        assert!(JS_TEMPLATE_QUERY.is_match("db.query(`SELECT * FROM t WHERE id = ${id}`)"));
        assert!(!JS_TEMPLATE_QUERY.is_match("db.query('SELECT 1')"));
        assert!(HTML_DEPRECATED_TAG.is_match("<CENTER>hi</CENTER>"));
        assert!(!HTML_DEPRECATED_TAG.is_match("<footer>"));
    }

    #[test]
    fn test_short_hex_only_in_declarations() {
        assert!(CSS_SHORT_HEX.is_match("  color: #fff;"));
        assert!(!CSS_SHORT_HEX.is_match("  color: #ffffff;"));
        assert!(!CSS_SHORT_HEX.is_match("#abc { color: red; }"));
    }

    #[test]
    fn test_preamble() {
        assert!(PY_PREAMBLE.is_match("#!/usr/bin/env python"));
        assert!(PY_PREAMBLE.is_match("# -*- coding: utf-8 -*-"));
        assert!(!PY_PREAMBLE.is_match("# plain comment"));
    }
}
