//! Output formatting module for CLI

mod diff;
pub mod json;
mod terminal;

pub use diff::DiffPreview;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;

use std::path::Path;

use crate::error::FixLensError;
use crate::pipeline::RunResult;

/// What kind of run produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Scan,
    Fix,
    DryRun,
}

impl RunMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Fix => "fix",
            Self::DryRun => "dry-run",
        }
    }
}

/// Trait for rendering run output
pub trait RunRenderer {
    fn render_run(
        &self,
        root: &Path,
        mode: RunMode,
        result: &RunResult,
    ) -> Result<String, FixLensError>;
}
