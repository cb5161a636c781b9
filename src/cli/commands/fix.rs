//! Fix command - Repair issues in place
//!
//! `--dry-run` degrades to a scan-only run and prints the deterministic
//! rewrites as diffs instead of writing them.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{
    build_pipeline, emit, exit_code_for, open_cache, remaining_exit_code, save_cache, spinner,
    FixArgs, OutputFormat,
};
use crate::cli::exit_codes;
use crate::cli::output::{DiffPreview, JsonOutput, RunMode, RunRenderer, TerminalOutput};
use crate::config::Config;
use crate::fixes::PatchEngine;
use crate::pipeline::{FileStatus, RunOptions, RunResult};
use crate::rules::Issue;
use crate::scanner::FileRecord;

pub async fn execute(args: FixArgs, config: &Config) -> Result<i32> {
    if args.dry_run {
        return dry_run(args, config).await;
    }

    let Some(pipeline) = build_pipeline(config, &args.filters, true)? else {
        return Ok(exit_codes::INVALID_ARGS);
    };

    if !args.yes {
        let files = pipeline
            .discover(&args.path)
            .with_context(|| format!("Failed to scan {}", args.path.display()))?;
        if files.is_empty() {
            println!("{}", "No files to process.".green());
            return Ok(exit_codes::SUCCESS);
        }

        let confirm = Confirm::new()
            .with_prompt(format!(
                "Repair issues in up to {} file(s)? A backup is kept next to each modified file.",
                files.len()
            ))
            .default(false)
            .interact()?;

        if !confirm {
            println!("{}", "Aborted.".yellow());
            return Ok(exit_codes::SUCCESS);
        }
    }

    let mut cache = open_cache(&args.path, config, &args.filters);
    let options = RunOptions {
        apply_fixes: true,
        force_rescan: false,
    };

    let progress = spinner("Fixing...");
    let result = pipeline.run(&args.path, options, cache.as_mut()).await;
    progress.finish_and_clear();
    let result = result.with_context(|| format!("Failed to fix {}", args.path.display()))?;

    save_cache(cache.as_ref());

    let renderer: Box<dyn RunRenderer> = match args.format {
        OutputFormat::Terminal => Box::new(TerminalOutput::new()),
        OutputFormat::Json => Box::new(JsonOutput::new()),
    };
    println!("{}", renderer.render_run(&args.path, RunMode::Fix, &result)?);

    let failed = result.records_with_status(FileStatus::Error).count();
    if failed > 0 {
        eprintln!(
            "{} {} file(s) could not be fixed",
            "Warning:".yellow(),
            failed
        );
    }

    Ok(remaining_exit_code(&result))
}

async fn dry_run(args: FixArgs, config: &Config) -> Result<i32> {
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

    match args.format {
        OutputFormat::Json => {
            emit(
                &JsonOutput::new().render_run(&args.path, RunMode::DryRun, &result)?,
                None,
            )?;
        }
        OutputFormat::Terminal => {
            print_previews(&result);
            println!(
                "{}",
                TerminalOutput::new().render_run(&args.path, RunMode::DryRun, &result)?
            );
            println!("{}", "Dry run mode - no changes made.".yellow());
        }
    }

    Ok(exit_code_for(result.issues_found.iter()))
}

/// Print what the deterministic rewrites would change, file by file
fn print_previews(result: &RunResult) {
    let mut by_file: BTreeMap<&PathBuf, Vec<Issue>> = BTreeMap::new();
    for found in &result.issues_found {
        by_file
            .entry(&found.file)
            .or_default()
            .push(found.issue.clone());
    }

    let engine = PatchEngine::new();
    let preview = DiffPreview::new();
    for (path, issues) in by_file {
        if issues.iter().any(|i| i.kind.is_reserved()) {
            continue;
        }
        let record = match FileRecord::read(path) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping preview");
                continue;
            }
        };
        let candidate = engine.apply_rules(record.language, &record.content, &issues);
        if let Some(diff) = preview.render(path, &record.content, &candidate) {
            println!("{diff}");
        }
    }
}
