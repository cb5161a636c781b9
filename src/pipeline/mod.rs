//! Pipeline module - Per-file orchestration
//!
//! Every file goes through `read → analyze → [patch → validate → persist]`
//! in that order and ends up `clean`, `flagged`, `fixed` or `error`. Faults are
//! recorded against the file; only a missing root or a broken worker pool
//! end a run early.
//!
//! Analysis runs on the rayon pool. The fix stage runs one tokio task per
//! file, bounded by a semaphore; each file is owned by exactly one task.

pub mod results;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::cache::{AnalysisCache, FileStamp};
use crate::config::Config;
use crate::error::{FixLensError, ScanError};
use crate::fixes::{PatchEngine, RewriteCollaborator};
use crate::persist::{ChangeValidator, PersistenceGuard, Verdict};
use crate::rules::results::{Issue, IssueKind};
use crate::rules::IssueDetector;
use crate::scanner::{FileRecord, Scanner};
use crate::utils::{RunTiming, Timer};

pub use results::{FileStatus, FixRecord, FoundIssue, RunResult};

/// Per-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Patch, validate and persist files with issues
    pub apply_fixes: bool,
    /// Ignore any supplied analysis cache
    pub force_rescan: bool,
}

/// A discovered file waiting for analysis
#[derive(Debug)]
struct Job {
    path: PathBuf,
    relative: PathBuf,
    stamp: Option<FileStamp>,
    cached: Option<Vec<Issue>>,
}

/// Result of reading and analysing one file
#[derive(Debug)]
struct Analysis {
    path: PathBuf,
    relative: PathBuf,
    stamp: Option<FileStamp>,
    record: Option<FileRecord>,
    issues: Vec<Issue>,
    /// Unfiltered detector output, ready for caching
    fresh: Option<Vec<Issue>>,
    failed: bool,
}

/// Everything a worker needs to process one file
#[derive(Debug, Clone)]
struct FileWorker {
    detector: IssueDetector,
    engine: PatchEngine,
    validator: ChangeValidator,
    guard: PersistenceGuard,
}

impl FileWorker {
    fn analyze(&self, job: Job, with_context: bool) -> Analysis {
        let span = info_span!("file", path = %job.path.display());
        let _guard = span.enter();

        let mut analysis = Analysis {
            path: job.path,
            relative: job.relative,
            stamp: job.stamp,
            record: None,
            issues: Vec::new(),
            fresh: None,
            failed: false,
        };

        let record = match FileRecord::read(&analysis.path) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable file");
                analysis
                    .issues
                    .push(Issue::new(IssueKind::FileError, e.to_string(), 0));
                analysis.failed = true;
                return analysis;
            }
        };

        // The cache holds unfiltered detector output; filters apply per run
        match job.cached {
            Some(issues) => analysis.issues = self.detector.filter(issues),
            None => match self.detector.detect(&record) {
                Ok(issues) => {
                    analysis.issues = self.detector.filter(issues.clone());
                    analysis.fresh = Some(issues);
                }
                Err(e) => {
                    warn!(error = %e, "Detector failed");
                    analysis
                        .issues
                        .push(Issue::new(IssueKind::AnalysisError, e.to_string(), 0));
                    analysis.failed = true;
                    return analysis;
                }
            },
        }

        let has_syntax_error = analysis
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::SyntaxError);
        if with_context && !has_syntax_error {
            match self.detector.analyze_context(&record) {
                Ok(context) => analysis.issues.extend(context),
                Err(e) => debug!(error = %e, "Context analysis skipped"),
            }
        }

        debug!(issues = analysis.issues.len(), "Analyzed");
        analysis.record = Some(record);
        analysis
    }

    async fn fix(&self, record: FileRecord, issues: Vec<Issue>) -> FixRecord {
        let mut outcome = FixRecord {
            file: record.path.clone(),
            status: FileStatus::Error,
            issue_count: issues.len(),
            detail: None,
            backup: None,
        };

        let candidate = match self.engine.fix(&record, &issues).await {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(error = %e, "Patch failed");
                outcome.detail = Some(e.to_string());
                return outcome;
            }
        };

        let verdict = self.validator.check(&record.content, &candidate);
        if verdict != Verdict::Accept {
            debug!(verdict = ?verdict, "Candidate not persisted");
            outcome.status = FileStatus::Flagged;
            outcome.detail = verdict.detail();
            return outcome;
        }

        match self.guard.persist(&record.path, &candidate) {
            Ok(backup) => {
                outcome.status = FileStatus::Fixed;
                outcome.backup = backup;
            }
            Err(e) => {
                warn!(error = %e, "Write failed");
                outcome.detail = Some(e.to_string());
            }
        }
        outcome
    }
}

/// Drives discovery, analysis and fixing over a tree
#[derive(Debug, Clone)]
pub struct Pipeline {
    scanner: Scanner,
    worker: FileWorker,
    max_files: usize,
    workers: usize,
}

impl Pipeline {
    /// Build a pipeline with deterministic rewrites only
    pub fn new(config: &Config) -> Result<Self, FixLensError> {
        Ok(Self {
            scanner: Scanner::new(&config.scan)?,
            worker: FileWorker {
                detector: IssueDetector::new(config),
                engine: PatchEngine::new(),
                validator: ChangeValidator::new(&config.fix),
                guard: PersistenceGuard::new(config.scan.backup_marker.clone()),
            },
            max_files: config.run.max_files,
            workers: config.run.effective_workers(),
        })
    }

    /// Replace the patch engine
    pub fn with_engine(mut self, engine: PatchEngine) -> Self {
        self.worker.engine = engine;
        self
    }

    /// Route context-heavy issues to `collaborator`
    pub fn with_collaborator(
        self,
        collaborator: Arc<dyn RewriteCollaborator>,
        config: &Config,
    ) -> Self {
        let engine = PatchEngine::new().with_collaborator(collaborator, &config.collaborator);
        self.with_engine(engine)
    }

    /// Access the detector, e.g. to apply --only / --skip
    pub fn detector_mut(&mut self) -> &mut IssueDetector {
        &mut self.worker.detector
    }

    /// Discover the files of one run: sorted, backups excluded, capped
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, FixLensError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound {
                path: root.display().to_string(),
            }
            .into());
        }

        let mut files: Vec<PathBuf> = self.scanner.scan(root).into_iter().collect();
        files.sort();
        if self.max_files > 0 && files.len() > self.max_files {
            debug!(
                discovered = files.len(),
                ceiling = self.max_files,
                "Dropping files beyond the per-run ceiling"
            );
            files.truncate(self.max_files);
        }
        Ok(files)
    }

    /// Run the pipeline over `root`
    ///
    /// # Arguments
    ///
    /// * `root` - Directory or single file to process
    /// * `options` - Whether to fix, and whether to ignore `cache`
    /// * `cache` - Optional analysis cache, updated in place
    pub async fn run(
        &self,
        root: &Path,
        options: RunOptions,
        cache: Option<&mut AnalysisCache>,
    ) -> Result<RunResult, FixLensError> {
        let mut cache = if options.force_rescan { None } else { cache };
        info!(
            root = %root.display(),
            apply_fixes = options.apply_fixes,
            cached = cache.is_some(),
            "Starting run"
        );

        let discovery = Timer::start();
        let files = self.discover(root)?;
        let mut timing = RunTiming {
            discovery: discovery.elapsed(),
            ..RunTiming::default()
        };

        let processing = Timer::start();
        let cache_root = if root.is_file() {
            root.parent().unwrap_or(root)
        } else {
            root
        };
        let jobs: Vec<Job> = files
            .iter()
            .map(|path| {
                let relative = path.strip_prefix(cache_root).unwrap_or(path).to_path_buf();
                let stamp = FileStamp::of(path).ok();
                let cached = match (&cache, &stamp) {
                    (Some(cache), Some(stamp)) => cache.get(&relative, stamp).map(|i| i.to_vec()),
                    _ => None,
                };
                Job {
                    path: path.clone(),
                    relative,
                    stamp,
                    cached,
                }
            })
            .collect();

        let worker = Arc::new(self.worker.clone());
        let with_context = options.apply_fixes && worker.engine.has_collaborator();
        let analysis_worker = Arc::clone(&worker);
        let analyses: Vec<Analysis> = tokio::task::spawn_blocking(move || {
            jobs.into_par_iter()
                .map(|job| analysis_worker.analyze(job, with_context))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| FixLensError::WorkerPool(e.to_string()))?;

        let mut result = RunResult {
            scanned_files: files.len(),
            ..RunResult::default()
        };
        let mut to_fix: Vec<(FileRecord, Vec<Issue>)> = Vec::new();

        for analysis in analyses {
            if let (Some(cache), Some(stamp), Some(fresh)) =
                (cache.as_deref_mut(), analysis.stamp, analysis.fresh)
            {
                cache.insert(analysis.relative.clone(), stamp, fresh);
            }
            if analysis.issues.is_empty() {
                continue;
            }

            result.files_with_issues += 1;
            result
                .issues_found
                .extend(analysis.issues.iter().map(|issue| FoundIssue {
                    file: analysis.path.clone(),
                    issue: issue.clone(),
                }));

            if analysis.failed {
                if options.apply_fixes {
                    result.fixes_applied.push(FixRecord {
                        file: analysis.path.clone(),
                        status: FileStatus::Error,
                        issue_count: analysis.issues.len(),
                        detail: analysis.issues.first().map(|i| i.message.clone()),
                        backup: None,
                    });
                }
                continue;
            }
            if options.apply_fixes {
                if let Some(record) = analysis.record {
                    to_fix.push((record, analysis.issues));
                }
            }
        }

        if !to_fix.is_empty() {
            let records = self.fix_all(worker, to_fix).await?;
            for record in records {
                if record.status == FileStatus::Fixed {
                    result.files_fixed += 1;
                    if let Some(cache) = cache.as_deref_mut() {
                        let relative = record.file.strip_prefix(cache_root).unwrap_or(&record.file);
                        cache.invalidate(relative);
                    }
                }
                result.fixes_applied.push(record);
            }
            result.fixes_applied.sort_by(|a, b| a.file.cmp(&b.file));
        }

        timing.processing = processing.elapsed();
        result.timing = timing;

        info!(
            scanned = result.scanned_files,
            with_issues = result.files_with_issues,
            fixed = result.files_fixed,
            "Run complete"
        );
        Ok(result)
    }

    /// Patch, validate and persist files concurrently
    ///
    /// A task that dies is recorded as an error against its own file.
    async fn fix_all(
        &self,
        worker: Arc<FileWorker>,
        files: Vec<(FileRecord, Vec<Issue>)>,
    ) -> Result<Vec<FixRecord>, FixLensError> {
        let permits = Arc::new(Semaphore::new(self.workers.max(1)));
        let mut handles = Vec::with_capacity(files.len());

        for (record, issues) in files {
            let worker = Arc::clone(&worker);
            let permits = Arc::clone(&permits);
            let file = record.path.clone();
            let issue_count = issues.len();
            let span = info_span!("fix", path = %record.path.display());
            let handle = tokio::spawn(
                async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| FixLensError::WorkerPool(e.to_string()))?;
                    Ok::<_, FixLensError>(worker.fix(record, issues).await)
                }
                .instrument(span),
            );
            handles.push((file, issue_count, handle));
        }

        let mut records = Vec::with_capacity(handles.len());
        for (file, issue_count, handle) in handles {
            let failure = match handle.await {
                Ok(Ok(record)) => {
                    records.push(record);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) => e.to_string(),
            };
            warn!(path = %file.display(), error = %failure, "Fix task failed");
            records.push(FixRecord {
                file,
                status: FileStatus::Error,
                issue_count,
                detail: Some(failure),
                backup: None,
            });
        }
        Ok(records)
    }
}
