//! Report cache for folder re-runs.
//!
//! Analyzing a 24-megapixel frame means several full-image filter passes. A
//! folder that is re-graded after adding a handful of new files should not pay
//! that cost again for the files that did not change. This module stores each
//! finished [`QualityReport`] and hands it back when the same bytes are
//! analyzed with the same parameters.
//!
//! # Design
//!
//! The cache is **content-addressed**: lookups are by the combination of
//! `source_hash` and `params_hash`, not by file path. Renaming or moving a
//! file keeps its entry valid; the returned report is re-pointed at the
//! current path.
//!
//! - **`source_hash`**: SHA-256 of the file contents. Content-based rather
//!   than mtime-based so it survives `git checkout` and copies between disks.
//!
//! - **`params_hash`**: SHA-256 of the resolved print-size list. Changing the
//!   `[print] sizes` filter changes every report's print section, so it
//!   invalidates every entry.
//!
//! Analyzer thresholds are compile-time constants. Changing them requires a
//! bump of [`CACHE_VERSION`], which discards every existing cache file.
//!
//! ## Storage
//!
//! The cache is a JSON file at `<dir>/.print-grade-cache.json` in the analyzed
//! folder. Entries not touched by a run are pruned before saving, so the file
//! tracks the folder's current contents.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `batch`, or set `[batch] cache = false`. Nothing is
//! read or written in that case.

use crate::print_size::{self, PrintSize};
use crate::report::QualityReport;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the analyzed directory.
const CACHE_FILENAME: &str = ".print-grade-cache.json";

/// Version of the cache format and of the analysis it stores. Bump this to
/// invalidate all existing caches when either changes.
pub const CACHE_VERSION: u32 = 2;

/// On-disk report cache keyed by `"{source_hash}:{params_hash}"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCache {
    pub version: u32,
    pub entries: HashMap<String, QualityReport>,
}

impl ReportCache {
    /// Create an empty cache (used for `--no-cache` or first run).
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from a directory. Returns an empty cache if the file doesn't
    /// exist or can't be parsed (version mismatch, corruption).
    pub fn load(dir: &Path) -> Self {
        let path = cache_path(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let cache: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache");
                return Self::empty();
            }
        };
        if cache.version != CACHE_VERSION {
            tracing::debug!(found = cache.version, expected = CACHE_VERSION, "cache version mismatch");
            return Self::empty();
        }
        cache
    }

    /// Save to a directory.
    pub fn save(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(dir), json)
    }

    /// Look up a stored report by content hashes, re-pointed at `path`.
    pub fn find(&self, source_hash: &str, params_hash: &str, path: &Path) -> Option<QualityReport> {
        let mut report = self.entries.get(&content_key(source_hash, params_hash))?.clone();
        report.path = path.to_path_buf();
        Some(report)
    }

    /// Record a finished report.
    pub fn insert(&mut self, source_hash: &str, params_hash: &str, report: QualityReport) {
        self.entries.insert(content_key(source_hash, params_hash), report);
    }

    /// Drop every entry whose key is not in `live`.
    pub fn retain_keys(&mut self, live: &HashSet<String>) {
        self.entries.retain(|key, _| live.contains(key));
    }
}

pub fn content_key(source_hash: &str, params_hash: &str) -> String {
    format!("{}:{}", source_hash, params_hash)
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the analysis parameters.
///
/// The filter is resolved against the catalog first, so an empty filter and
/// an explicit list of every catalog size hash the same.
pub fn hash_params(size_filter: &[PrintSize]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"print-sizes\0");
    for size in print_size::select_sizes(size_filter) {
        hasher.update(size.width.to_le_bytes());
        hasher.update(size.height.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a folder run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} analyzed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} analyzed", self.misses)
        }
    }
}

/// Resolve the cache file path for a directory.
pub fn cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILENAME)
}
