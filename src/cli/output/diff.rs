//! Unified diff previews for dry runs

use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::Path;

/// Renders the difference between a file and its candidate
pub struct DiffPreview {
    context: usize,
}

impl DiffPreview {
    pub fn new() -> Self {
        Self { context: 2 }
    }

    /// Render a colored unified diff, or `None` when nothing changes
    pub fn render(&self, path: &Path, original: &str, candidate: &str) -> Option<String> {
        if original == candidate {
            return None;
        }

        let diff = TextDiff::from_lines(original, candidate);
        let mut output = format!(
            "{}\n{}\n",
            format!("--- {}", path.display()).red(),
            format!("+++ {}", path.display()).green()
        );

        for group in diff.grouped_ops(self.context) {
            let (first, last) = match (group.first(), group.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => continue,
            };
            let old = first.old_range().start..last.old_range().end;
            let new = first.new_range().start..last.new_range().end;
            output.push_str(
                &format!(
                    "@@ -{},{} +{},{} @@\n",
                    old.start + 1,
                    old.len(),
                    new.start + 1,
                    new.len()
                )
                .cyan()
                .to_string(),
            );

            for op in &group {
                for change in diff.iter_changes(op) {
                    let line = change.to_string_lossy();
                    let line = line.trim_end_matches(['\n', '\r']);
                    let rendered = match change.tag() {
                        ChangeTag::Delete => format!("-{}", line).red().to_string(),
                        ChangeTag::Insert => format!("+{}", line).green().to_string(),
                        ChangeTag::Equal => format!(" {}", line),
                    };
                    output.push_str(&rendered);
                    output.push('\n');
                }
            }
        }

        Some(output)
    }
}

impl Default for DiffPreview {
    fn default() -> Self {
        Self::new()
    }
}
