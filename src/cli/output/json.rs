//! JSON output formatting

use serde::Serialize;
use std::path::Path;

use super::{RunMode, RunRenderer};
use crate::error::FixLensError;
use crate::pipeline::RunResult;
use crate::rules::Severity;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct RunOutput<'a> {
    version: &'static str,
    root: String,
    mode: &'static str,
    summary: Summary,
    #[serde(flatten)]
    result: &'a RunResult,
}

#[derive(Serialize)]
struct Summary {
    critical_count: usize,
    warning_count: usize,
    info_count: usize,
}

impl RunRenderer for JsonOutput {
    fn render_run(
        &self,
        root: &Path,
        mode: RunMode,
        result: &RunResult,
    ) -> Result<String, FixLensError> {
        let output = RunOutput {
            version: env!("CARGO_PKG_VERSION"),
            root: root.display().to_string(),
            mode: mode.name(),
            summary: Summary {
                critical_count: result.count_by_severity(Severity::Critical),
                warning_count: result.count_by_severity(Severity::Warning),
                info_count: result.count_by_severity(Severity::Info),
            },
            result,
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }
}
