//! Error types for the md5list manifest generator.

use std::path::PathBuf;
use thiserror::Error;

/// Digest engine errors
#[derive(Debug, Error)]
pub enum DigestError {
    /// `update` was called on a finalized engine without an intervening `start`.
    #[error("Digest already finalized; call start() before feeding more data")]
    Finalized,

    /// The chunk source failed while streaming into the engine.
    #[error("Chunk source failed: {0}")]
    Source(#[from] std::io::Error),
}

/// Per-entry walk failures.
///
/// These never escape a walk: the walker wraps each one in a
/// [`SkipNotice`](crate::tree::walker::SkipNotice) and moves on to the next entry.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Cannot read directory {path:?}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Entry vanished before inspection: {path:?}")]
    EntryVanished { path: PathBuf },

    #[error("Entry not accessible {path:?}: {source}")]
    EntryInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file ({kind}): {path:?}")]
    NotRegular { path: PathBuf, kind: &'static str },

    #[error("Symbolic link cycle at {path:?}")]
    SymlinkLoop { path: PathBuf },

    #[error("Failed to read file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Digest engine misuse on {path:?}")]
    EngineMisuse { path: PathBuf },
}

impl WalkError {
    /// Path of the entry the failure belongs to
    pub fn path(&self) -> &std::path::Path {
        match self {
            WalkError::DirectoryUnreadable { path, .. }
            | WalkError::EntryVanished { path }
            | WalkError::EntryInaccessible { path, .. }
            | WalkError::NotRegular { path, .. }
            | WalkError::SymlinkLoop { path }
            | WalkError::FileRead { path, .. }
            | WalkError::EngineMisuse { path } => path,
        }
    }
}

/// Run-level errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Reported and skipped; never aborts the run on its own.
    #[error("Path does not exist: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Manifest output failed: {0}")]
    OutputSink(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        ScanError::Config(err.to_string())
    }
}
