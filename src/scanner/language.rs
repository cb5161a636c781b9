//! Language detection from file extensions

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detector family a file is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Parsed with tree-sitter, then lexical rules
    Python,
    /// JavaScript and TypeScript, lexical rules
    JavaScript,
    /// HTML markup
    Html,
    /// CSS, SCSS and Sass
    Stylesheet,
    /// Supported for discovery but without a rule battery
    Other,
}

impl Language {
    /// Detect the language of a path from its extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Other)
    }

    /// Detect the language from an extension without the leading dot
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Self::Python,
            "js" | "jsx" | "ts" | "tsx" => Self::JavaScript,
            "html" | "htm" => Self::Html,
            "css" | "scss" | "sass" => Self::Stylesheet,
            _ => Self::Other,
        }
    }

    /// Prefixes that open a line comment, used to skip commented lines
    pub fn comment_prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &["#"],
            Self::JavaScript => &["//", "/*", "*"],
            Self::Html => &["<!--"],
            Self::Stylesheet | Self::Other => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Html => "html",
            Self::Stylesheet => "stylesheet",
            Self::Other => "other",
        }
    }
}
