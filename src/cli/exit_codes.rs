//! Exit codes for the CLI
//!
//! Standard exit codes used by the fixlens CLI for CI/CD integration.
//!
//! # Exit Code Reference
//!
//! | Code | Constant | Meaning | Example |
//! |------|----------|---------|---------|
//! | 0 | `SUCCESS` | Success | No issues, or info-level issues only |
//! | 1 | `CRITICAL_ISSUES` | Critical issues | Dynamic code execution, unparseable file |
//! | 2 | `WARNINGS` | Warnings | Bare except, `== None` comparison left in place |
//! | 3 | `ERROR` | Runtime error | Scan root missing, invalid configuration |
//! | 4 | `INVALID_ARGS` | Invalid arguments | Unknown preset, no known kind in `--only` |
//!
//! For `fix`, codes 1 and 2 are judged on the issues that remain once fixed
//! files are discounted.

/// Success - nothing left that needs attention.
pub const SUCCESS: i32 = 0;

/// At least one critical issue found (or left unfixed).
pub const CRITICAL_ISSUES: i32 = 1;

/// At least one warning found (or left unfixed), no critical issue.
pub const WARNINGS: i32 = 2;

/// Runtime error (missing root, unreadable configuration, failed write of a report).
pub const ERROR: i32 = 3;

/// Invalid arguments (unknown preset, unusable kind filter).
pub const INVALID_ARGS: i32 = 4;
