//! Folder analysis.
//!
//! Walks a directory, analyzes every JPEG and TIFF in parallel, and collects
//! one entry per file. A file that fails to hash or decode becomes a `failed`
//! entry; the run itself only fails when the directory cannot be read at all.
//!
//! ## Flow
//!
//! ```text
//! discover(dir) ──► [paths, sorted]
//!                      │  rayon par_iter, one worker per image
//!                      ▼
//!          hash ─► cache hit? ──yes──► stored report
//!                      │ no
//!                      ▼
//!                 report::analyze
//!                      │
//!                      ▼
//!      BatchReport { entries, summary, cache }
//! ```
//!
//! The worker count comes from the global rayon pool, which the binary sizes
//! from `[processing] max_processes`.

use crate::cache::{self, CacheStats, ReportCache};
use crate::grade::Grade;
use crate::print_size::PrintSize;
use crate::raster::SourceFormat;
use crate::report::{self, QualityReport};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Print-size filter passed to every analysis. Empty = whole catalog.
    pub sizes: Vec<PrintSize>,
    pub recursive: bool,
    pub use_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchOutcome {
    Analyzed { report: Box<QualityReport> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchEntry {
    pub fn report(&self) -> Option<&QualityReport> {
        match &self.outcome {
            BatchOutcome::Analyzed { report } => Some(&**report),
            BatchOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub failed: usize,
    /// Overall grade histogram over analyzed files.
    pub grades: BTreeMap<Grade, usize>,
    /// Analyzed files with at least one sellable print size.
    pub sellable: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
    pub cache: CacheStats,
}

/// Supported image files under `dir`, sorted by path.
///
/// Unreadable directory entries are logged and skipped.
pub fn discover(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let walker = WalkDir::new(dir).max_depth(if recursive { usize::MAX } else { 1 });
    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| SourceFormat::from_path(p) != SourceFormat::Other)
        .collect();
    files.sort();
    files
}

/// Per-file result before cache bookkeeping.
struct FileRun {
    path: PathBuf,
    source_hash: Option<String>,
    cached: bool,
    outcome: BatchOutcome,
}

fn run_file(path: PathBuf, options: &BatchOptions, params_hash: &str, cache: &ReportCache) -> FileRun {
    let source_hash = if options.use_cache {
        match cache::hash_file(&path) {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                return FileRun {
                    path,
                    source_hash: None,
                    cached: false,
                    outcome: BatchOutcome::Failed {
                        error: e.to_string(),
                    },
                };
            }
        }
    } else {
        None
    };

    if let Some(report) = source_hash
        .as_deref()
        .and_then(|h| cache.find(h, params_hash, &path))
    {
        tracing::debug!(path = %path.display(), "cache hit");
        return FileRun {
            path,
            source_hash,
            cached: true,
            outcome: BatchOutcome::Analyzed {
                report: Box::new(report),
            },
        };
    }

    let outcome = match report::analyze(&path, &options.sizes) {
        Ok(report) => BatchOutcome::Analyzed {
            report: Box::new(report),
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "analysis failed");
            BatchOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    FileRun {
        path,
        source_hash,
        cached: false,
        outcome,
    }
}

fn summarize(entries: &[BatchEntry]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for entry in entries {
        match entry.report() {
            Some(report) => {
                summary.analyzed += 1;
                *summary.grades.entry(report.grade).or_insert(0) += 1;
                if report.max_sellable_size.is_some() {
                    summary.sellable += 1;
                }
            }
            None => summary.failed += 1,
        }
    }
    summary
}

/// Analyze every supported image under `dir`.
pub fn analyze_folder(dir: &Path, options: &BatchOptions) -> Result<BatchReport, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.to_path_buf()));
    }

    let files = discover(dir, options.recursive);
    tracing::info!(dir = %dir.display(), files = files.len(), "analyzing folder");

    let params_hash = cache::hash_params(&options.sizes);
    let mut report_cache = if options.use_cache {
        ReportCache::load(dir)
    } else {
        ReportCache::empty()
    };

    let runs: Vec<FileRun> = files
        .into_par_iter()
        .map(|path| run_file(path, options, &params_hash, &report_cache))
        .collect();

    let mut stats = CacheStats::default();
    let mut live = HashSet::new();
    let mut entries = Vec::with_capacity(runs.len());
    for run in runs {
        if let BatchOutcome::Analyzed { report } = &run.outcome {
            if run.cached {
                stats.hit();
            } else {
                stats.miss();
            }
            if let Some(hash) = &run.source_hash {
                live.insert(cache::content_key(hash, &params_hash));
                if !run.cached {
                    report_cache.insert(hash, &params_hash, (**report).clone());
                }
            }
        }
        entries.push(BatchEntry {
            path: run.path,
            outcome: run.outcome,
        });
    }

    if options.use_cache {
        report_cache.retain_keys(&live);
        if let Err(e) = report_cache.save(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "could not write cache");
        }
    }

    let summary = summarize(&entries);
    tracing::info!(
        analyzed = summary.analyzed,
        failed = summary.failed,
        cache = %stats,
        "folder done"
    );

    Ok(BatchReport {
        root: dir.to_path_buf(),
        entries,
        summary,
        cache: stats,
    })
}
