//! Terminal output formatting with colors

use colored::Colorize;
use std::path::Path;

use super::{RunMode, RunRenderer};
use crate::error::FixLensError;
use crate::pipeline::{FileStatus, FixRecord, FoundIssue, RunResult};
use crate::rules::Severity;
use crate::utils::format_duration;

pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn format_header(&self, root: &Path, mode: RunMode) -> String {
        format!(
            r#"
{} v{}

{} {}
{} {}
"#,
            "fixlens".cyan().bold(),
            env!("CARGO_PKG_VERSION"),
            "Path:".dimmed(),
            root.display().to_string().white().bold(),
            "Mode:".dimmed(),
            mode.name().yellow()
        )
    }

    fn section(&self, title: &str) -> String {
        format!("\n{}\n{}\n\n", "━".repeat(50).dimmed(), title.bold())
    }

    fn format_issues(&self, result: &RunResult) -> String {
        let mut output = self.section("  ISSUES");

        if result.issues_found.is_empty() {
            output.push_str(&format!("  {}\n", "No issues found.".green()));
            return output;
        }

        let groups = [
            (Severity::Critical, "❌ CRITICAL".red().bold()),
            (Severity::Warning, "⚠️  WARNING".yellow().bold()),
            (Severity::Info, "ℹ️  INFO".blue().bold()),
        ];
        for (severity, label) in groups {
            let issues: Vec<&FoundIssue> = result
                .issues_found
                .iter()
                .filter(|f| f.issue.severity() == severity)
                .collect();
            if issues.is_empty() {
                continue;
            }
            output.push_str(&format!("{} ({})\n", label, issues.len()));
            for found in issues {
                output.push_str(&self.format_issue(found));
            }
            output.push('\n');
        }

        output
    }

    fn format_issue(&self, found: &FoundIssue) -> String {
        let location = if found.issue.is_file_level() {
            found.file.display().to_string()
        } else {
            format!("{}:{}", found.file.display(), found.issue.line)
        };
        format!(
            "  {} [{}] {}\n    {} {}\n",
            "•".dimmed(),
            found.issue.kind.name().cyan(),
            found.issue.message,
            "└─".dimmed(),
            location.dimmed()
        )
    }

    fn format_fixes(&self, result: &RunResult) -> String {
        let mut output = self.section("  FIXES");

        if result.fixes_applied.is_empty() {
            output.push_str(&format!("  {}\n", "Nothing to fix.".green()));
            return output;
        }

        for record in &result.fixes_applied {
            output.push_str(&self.format_record(record));
        }
        output
    }

    fn format_record(&self, record: &FixRecord) -> String {
        let marker = match record.status {
            FileStatus::Fixed => "✓".green(),
            FileStatus::Flagged => "~".yellow(),
            FileStatus::Error => "✗".red(),
            FileStatus::Clean => "·".dimmed(),
        };
        let mut output = format!(
            "  {} {} ({} issue(s), {})\n",
            marker,
            record.file.display(),
            record.issue_count,
            record.status
        );
        if let Some(detail) = &record.detail {
            output.push_str(&format!("      {} {}\n", "└─".dimmed(), detail.dimmed()));
        }
        if let Some(backup) = &record.backup {
            output.push_str(&format!(
                "      {} backup: {}\n",
                "└─".dimmed(),
                backup.display().to_string().dimmed()
            ));
        }
        output
    }

    fn format_summary(&self, mode: RunMode, result: &RunResult) -> String {
        let mut output = self.section("  SUMMARY");

        output.push_str(&format!(
            "Files: {} scanned │ {} with issues │ {} fixed\n",
            result.scanned_files.to_string().bold(),
            result.files_with_issues.to_string().yellow().bold(),
            result.files_fixed.to_string().green().bold()
        ));
        output.push_str(&format!(
            "Critical: {} │ Warnings: {} │ Info: {}\n",
            result
                .count_by_severity(Severity::Critical)
                .to_string()
                .red()
                .bold(),
            result
                .count_by_severity(Severity::Warning)
                .to_string()
                .yellow()
                .bold(),
            result
                .count_by_severity(Severity::Info)
                .to_string()
                .blue()
                .bold()
        ));
        output.push_str(&format!(
            "Time: {} {}\n",
            result.timing.total_formatted(),
            format!(
                "(discovery {}, processing {})",
                format_duration(result.timing.discovery),
                format_duration(result.timing.processing)
            )
            .dimmed()
        ));

        if mode != RunMode::Fix && result.files_with_issues > 0 {
            output.push_str(&format!(
                "\nRun '{}' to repair these files.\n",
                "fixlens fix".cyan()
            ));
        }

        output
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl RunRenderer for TerminalOutput {
    fn render_run(
        &self,
        root: &Path,
        mode: RunMode,
        result: &RunResult,
    ) -> Result<String, FixLensError> {
        let mut output = String::new();

        output.push_str(&self.format_header(root, mode));
        output.push_str(&self.format_issues(result));
        if mode == RunMode::Fix {
            output.push_str(&self.format_fixes(result));
        }
        output.push_str(&self.format_summary(mode, result));

        Ok(output)
    }
}
