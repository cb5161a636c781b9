//! CLI commands module

pub mod fix;
pub mod generate_man;
pub mod init;
pub mod scan;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::AnalysisCache;
use crate::cli::exit_codes;
use crate::config::Config;
use crate::fixes::ChatCollaborator;
use crate::pipeline::{FoundIssue, Pipeline, RunResult};
use crate::rules::constants::filter_valid_kinds;
use crate::rules::Severity;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Preset to use (minimal, standard, strict)
    #[arg(short, long, value_name = "PRESET")]
    pub preset: Option<String>,

    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Skip interactive prompts
    #[arg(long)]
    pub non_interactive: bool,
}

/// Issue selection and cache options shared by scan and fix
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only report these issue kinds (e.g. ComparisonBug,BareExcept)
    #[arg(long, value_delimiter = ',')]
    pub only: Option<Vec<String>>,

    /// Skip these issue kinds
    #[arg(long, value_delimiter = ',')]
    pub skip: Option<Vec<String>>,

    /// Disable cache and force a complete re-analysis
    #[arg(long)]
    pub no_cache: bool,

    /// Custom cache directory path
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// File or directory to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Output format (terminal, json)
    #[arg(short, long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Arguments for the fix command
#[derive(Args, Debug)]
pub struct FixArgs {
    /// File or directory to repair
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Show the deterministic rewrites as a diff without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Output format (terminal, json)
    #[arg(short, long, default_value = "terminal")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Arguments for the generate-man command
#[derive(Args, Debug)]
pub struct GenerateManArgs {
    /// Directory the man page is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,
}

/// Output format for scan and fix
#[derive(Debug, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

/// Build a pipeline with the configured rule selection
///
/// Returns `None` when `--only` named nothing the detector knows.
fn build_pipeline(
    config: &Config,
    filters: &FilterArgs,
    with_collaborator: bool,
) -> Result<Option<Pipeline>> {
    let mut pipeline = Pipeline::new(config).context("Failed to set up the pipeline")?;

    if let Some(only) = &filters.only {
        let kinds = filter_valid_kinds(only.clone());
        if kinds.is_empty() {
            eprintln!(
                "{} --only did not name any known issue kind",
                "Error:".red().bold()
            );
            return Ok(None);
        }
        pipeline.detector_mut().set_only_kinds(kinds);
    }
    if let Some(skip) = &filters.skip {
        pipeline
            .detector_mut()
            .set_skip_kinds(filter_valid_kinds(skip.clone()));
    }

    if with_collaborator {
        match ChatCollaborator::from_config(&config.collaborator) {
            Ok(Some(collaborator)) => {
                tracing::info!(collaborator = "chat", "Routing context-heavy issues");
                pipeline = pipeline.with_collaborator(Arc::new(collaborator), config);
            }
            Ok(None) => {}
            Err(e) => eprintln!(
                "{} Rewrite collaborator unavailable, using deterministic rewrites only: {}",
                "Warning:".yellow(),
                e
            ),
        }
    }

    Ok(Some(pipeline))
}

/// Load the analysis cache for `root` unless caching is off
fn open_cache(root: &Path, config: &Config, filters: &FilterArgs) -> Option<AnalysisCache> {
    if filters.no_cache || !config.cache.enabled {
        return None;
    }

    let mut cache_config = config.cache.clone();
    if let Some(dir) = &filters.cache_dir {
        cache_config.directory = dir.display().to_string();
    }

    let project_root = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    Some(AnalysisCache::load(project_root, cache_config))
}

/// Persist the cache, warning instead of failing the command
fn save_cache(cache: Option<&AnalysisCache>) {
    if let Some(cache) = cache {
        if let Err(e) = cache.save() {
            eprintln!("{} Failed to save cache: {}", "Warning:".yellow(), e);
        }
    }
}

/// Spinner on stderr while a run is in flight, hidden when stderr is not a terminal
fn spinner(message: &'static str) -> ProgressBar {
    if !console::Term::stderr().is_term() {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Write rendered output to a file, or to stdout
fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Report written to: {}",
                "Success:".green().bold(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Exit code for a set of issues: critical first, then warnings
fn exit_code_for<'a>(issues: impl Iterator<Item = &'a FoundIssue>) -> i32 {
    let mut code = exit_codes::SUCCESS;
    for found in issues {
        match found.issue.severity() {
            Severity::Critical => return exit_codes::CRITICAL_ISSUES,
            Severity::Warning => code = exit_codes::WARNINGS,
            Severity::Info => {}
        }
    }
    code
}

/// Exit code of a fix run, judged on what is left after fixing
fn remaining_exit_code(result: &RunResult) -> i32 {
    exit_code_for(result.remaining_issues())
}
