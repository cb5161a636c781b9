//! Issue kind name validation for --only and --skip options

use colored::Colorize;

use super::results::IssueKind;

/// Names accepted by --only and --skip
pub fn valid_kind_names() -> Vec<&'static str> {
    IssueKind::ALL.iter().map(|k| k.name()).collect()
}

/// Check if a kind name is valid
pub fn is_valid_kind(name: &str) -> bool {
    IssueKind::from_name(name).is_some()
}

/// Resolve a list of kind names, printing warnings for unknown ones
pub fn filter_valid_kinds(names: Vec<String>) -> Vec<IssueKind> {
    let mut valid = Vec::new();
    for name in names {
        match IssueKind::from_name(&name) {
            Some(kind) => valid.push(kind),
            None => {
                eprintln!(
                    "{} Unknown issue kind '{}' ignored. Valid kinds: {}",
                    "Warning:".yellow(),
                    name.cyan(),
                    valid_kind_names().join(", ").dimmed()
                );
            }
        }
    }
    valid
}
