//! Scan orchestration across multiple roots
//!
//! Validates each root, walks the ones that exist and merges their summaries.
//! A missing root is reported and skipped; the remaining roots still run.

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::tree::path::resolve_root;
use crate::tree::walker::{FileOpener, FsOpener, WalkSink, WalkSummary, Walker};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Outcome of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    /// Roots that were walked, in absolute form
    pub roots_walked: Vec<PathBuf>,
    /// Roots that did not exist when validated
    pub missing_roots: Vec<PathBuf>,
    #[serde(flatten)]
    pub totals: WalkSummary,
}

/// Runs one walk per root against a shared sink
pub struct Scanner<O: FileOpener = FsOpener> {
    walker: Walker<O>,
}

impl Scanner<FsOpener> {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            walker: Walker::new(config.walker_config()),
        }
    }
}

impl<O: FileOpener> Scanner<O> {
    pub fn with_walker(walker: Walker<O>) -> Self {
        Self { walker }
    }

    /// Never fingerprint `path` in any root
    pub fn excluding(mut self, path: PathBuf) -> Self {
        self.walker.exclude(path);
        self
    }

    /// Walk every root in order.
    ///
    /// Fails only when the sink cannot be written.
    pub fn run<P, S>(&self, roots: &[P], sink: &mut S) -> Result<ScanSummary, ScanError>
    where
        P: AsRef<Path>,
        S: WalkSink + ?Sized,
    {
        let mut summary = ScanSummary::default();

        for root in roots {
            let root = root.as_ref();

            let resolved = match validate_root(root) {
                Ok(resolved) => resolved,
                Err(e) => {
                    error!(root = %root.display(), "{}", e);
                    summary.missing_roots.push(root.to_path_buf());
                    continue;
                }
            };

            info!(root = %resolved.display(), "Scanning root");
            let totals = self.walker.walk(&resolved, sink)?;
            info!(
                root = %resolved.display(),
                files = totals.files_hashed,
                skipped = totals.skipped(),
                "Root complete"
            );

            summary.totals.merge(&totals);
            summary.roots_walked.push(resolved);
        }

        Ok(summary)
    }
}

/// Check that a root exists and resolve it to absolute form
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    if !root.try_exists().unwrap_or(false) {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    // If the root disappears before it is resolved, fall back to a lexically
    // absolute path; the walker then reports the root itself as unreadable.
    Ok(resolve_root(root)
        .or_else(|_| std::path::absolute(root))
        .unwrap_or_else(|_| root.to_path_buf()))
}
