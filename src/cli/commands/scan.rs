//! Scan command - Report issues without touching any file

use anyhow::{Context, Result};

use super::{build_pipeline, emit, exit_code_for, open_cache, save_cache, spinner, OutputFormat, ScanArgs};
use crate::cli::exit_codes;
use crate::cli::output::{JsonOutput, RunMode, RunRenderer, TerminalOutput};
use crate::config::Config;
use crate::pipeline::RunOptions;

/// Execute the scan command
///
/// # Returns
///
/// An exit code: 0 when clean or info only, 1 for critical issues, 2 for warnings
pub async fn execute(args: ScanArgs, config: &Config) -> Result<i32> {
    let Some(pipeline) = build_pipeline(config, &args.filters, false)? else {
        return Ok(exit_codes::INVALID_ARGS);
    };
    let mut cache = open_cache(&args.path, config, &args.filters);

    let progress = spinner("Scanning...");
    let result = pipeline
        .run(&args.path, RunOptions::default(), cache.as_mut())
        .await;
    progress.finish_and_clear();
    let result = result.with_context(|| format!("Failed to scan {}", args.path.display()))?;

    save_cache(cache.as_ref());

    let renderer: Box<dyn RunRenderer> = match args.format {
        OutputFormat::Terminal => Box::new(TerminalOutput::new()),
        OutputFormat::Json => Box::new(JsonOutput::new()),
    };
    let rendered = renderer.render_run(&args.path, RunMode::Scan, &result)?;
    emit(&rendered, args.output.as_deref())?;

    Ok(exit_code_for(result.issues_found.iter()))
}
