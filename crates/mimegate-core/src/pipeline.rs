//! Batch scanning: walk paths, apply excludes, scan files in parallel.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GatekeeperConfig;
use crate::error::{ScanError, ScanResult};
use crate::outcome::{Detection, ScanOutcome};
use crate::scanner::Gatekeeper;

/// Walk settings for [`scan_paths`].
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Glob patterns, relative to each directory argument, that are skipped.
    pub exclude: Vec<String>,
    /// Fail with [`ScanError::TooManyFiles`] above this many files.
    pub max_files: Option<usize>,
}

impl ScanOptions {
    pub fn from_config(config: &GatekeeperConfig) -> Self {
        Self {
            exclude: config.exclude.clone(),
            max_files: config.max_files,
        }
    }
}

/// Outcome for one scanned file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Absent when the file was not sniffed (unconfigured, unreadable or
    /// misconfigured scans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
    pub outcome: ScanOutcome,
}

/// Result of a batch scan, sorted by path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub files: Vec<FileReport>,
    pub accepted: usize,
    pub rejected: usize,
    pub inconclusive: usize,
    /// Wall-clock time spent scanning, in milliseconds.
    pub elapsed_ms: u64,
}

impl ScanReport {
    /// Sort `files` by path and count outcomes.
    pub fn new(mut files: Vec<FileReport>, elapsed_ms: u64) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let count = |f: fn(&ScanOutcome) -> bool| files.iter().filter(|r| f(&r.outcome)).count();
        let accepted = count(ScanOutcome::is_ok);
        let rejected = count(|o| matches!(o, ScanOutcome::Rejected(_)));
        let inconclusive = count(|o| matches!(o, ScanOutcome::Inconclusive(_)));
        Self {
            files,
            accepted,
            rejected,
            inconclusive,
            elapsed_ms,
        }
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Number of files that would be blocked.
    pub fn blocked(&self) -> usize {
        self.rejected + self.inconclusive
    }

    pub fn has_blocked(&self) -> bool {
        self.blocked() > 0
    }
}

/// Scan files and directories with one gatekeeper.
///
/// Directories are walked recursively. Hidden and git-ignored files are
/// scanned like any other upload. File arguments are always scanned, and
/// paths that do not exist are reported as inconclusive.
pub fn scan_paths(
    paths: &[PathBuf],
    gatekeeper: &Gatekeeper,
    options: &ScanOptions,
) -> ScanResult<ScanReport> {
    let start = Instant::now();
    let excludes = compile_exclude_patterns(&options.exclude)?;

    let mut targets = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_dir(path, &excludes, &mut targets);
        } else {
            targets.push(path.clone());
        }
        if let Some(limit) = options.max_files
            && targets.len() > limit
        {
            return Err(ScanError::TooManyFiles {
                count: targets.len(),
                limit,
            });
        }
    }
    debug!(files = targets.len(), "collected scan targets");

    let files: Vec<FileReport> = targets
        .into_par_iter()
        .map(|path| {
            let (detection, outcome) = gatekeeper.scan_detailed(&path, "");
            FileReport {
                path,
                detection,
                outcome,
            }
        })
        .collect();

    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let report = ScanReport::new(files, elapsed_ms);
    info!(
        total = report.total(),
        rejected = report.rejected,
        inconclusive = report.inconclusive,
        elapsed_ms,
        "scan finished"
    );
    Ok(report)
}

struct ExcludePattern {
    pattern: glob::Pattern,
    /// Set for patterns written as `dir/`, which only match directories.
    dir_only: bool,
}

fn compile_exclude_patterns(excludes: &[String]) -> ScanResult<Vec<ExcludePattern>> {
    excludes
        .iter()
        .map(|raw| {
            let normalized = raw.replace('\\', "/");
            let (glob_str, dir_only) = match normalized.strip_suffix('/') {
                Some(prefix) => (prefix.to_string(), true),
                None => (normalized, false),
            };
            let pattern =
                glob::Pattern::new(&glob_str).map_err(|e| ScanError::InvalidExcludePattern {
                    pattern: raw.clone(),
                    message: e.to_string(),
                })?;
            Ok(ExcludePattern { pattern, dir_only })
        })
        .collect()
}

fn collect_dir(root: &Path, excludes: &[ExcludePattern], targets: &mut Vec<PathBuf>) {
    for entry in WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build()
        .filter_map(|entry| entry.ok())
    {
        let path = entry.path();
        // Pipes, sockets and devices are never uploads; links count when
        // they resolve to a regular file.
        let is_file = entry
            .file_type()
            .is_some_and(|ft| ft.is_file() || (ft.is_symlink() && path.is_file()));
        if !is_file {
            continue;
        }
        let rel = rel_path(path, root);
        if is_excluded(&rel, excludes) {
            debug!(path = %path.display(), "excluded");
            continue;
        }
        targets.push(path.to_path_buf());
    }
}

/// A file is excluded when a pattern matches it, or matches one of its
/// parent directories.
fn is_excluded(rel: &str, excludes: &[ExcludePattern]) -> bool {
    let mut parents = Vec::new();
    let mut rest = rel;
    while let Some((parent, _)) = rest.rsplit_once('/') {
        parents.push(parent);
        rest = parent;
    }
    excludes.iter().any(|p| {
        (!p.dir_only && p.pattern.matches(rel)) || parents.iter().any(|dir| p.pattern.matches(dir))
    })
}

fn rel_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
