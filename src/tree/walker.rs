//! Filesystem walker that fingerprints every regular file below a root
//!
//! Each listed entry is re-inspected right before classification, since the
//! listing and the lookup are not atomic. Failures are contained to the entry
//! (or subtree) where they occur and surface as [`SkipNotice`]s; only a failing
//! sink can stop a walk.

use crate::digest::{Md5Hash, BLOCK_SIZE};
use crate::error::{DigestError, ScanError, WalkError};
use crate::format::human_size;
use crate::manifest::ManifestRecord;
use crate::tree::path::extension_token;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Default read size per chunk (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Classification of one directory entry
#[derive(Debug)]
pub enum WalkOutcome {
    /// Directory; its entries follow in the walk
    Recurse(PathBuf),
    /// Regular file to fingerprint
    Hash(PathBuf),
    /// Entry vanished or became inaccessible after listing
    SkipUnavailable(WalkError),
    /// Device, socket, fifo, or a link that does not lead to a file or walked directory
    SkipNonRegular(WalkError),
    /// Directory that could not be listed; its subtree is skipped
    SkipDirectoryError(WalkError),
}

/// Broad category of a skipped entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    Unavailable,
    NonRegular,
    DirectoryError,
    ReadFailure,
}

impl SkipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipKind::Unavailable => "unavailable",
            SkipKind::NonRegular => "non_regular",
            SkipKind::DirectoryError => "directory_error",
            SkipKind::ReadFailure => "read_failure",
        }
    }
}

impl std::fmt::Display for SkipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report for an entry that produced no manifest record
#[derive(Debug)]
pub struct SkipNotice {
    pub error: WalkError,
}

impl SkipNotice {
    pub fn kind(&self) -> SkipKind {
        match self.error {
            WalkError::DirectoryUnreadable { .. } | WalkError::SymlinkLoop { .. } => {
                SkipKind::DirectoryError
            }
            WalkError::EntryVanished { .. } | WalkError::EntryInaccessible { .. } => {
                SkipKind::Unavailable
            }
            WalkError::NotRegular { .. } => SkipKind::NonRegular,
            WalkError::FileRead { .. } | WalkError::EngineMisuse { .. } => SkipKind::ReadFailure,
        }
    }

    pub fn path(&self) -> &Path {
        self.error.path()
    }
}

impl std::fmt::Display for SkipNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Receiver for walk results.
///
/// Records arrive in visitation order. A `record` error is fatal to the run.
pub trait WalkSink {
    fn record(&mut self, record: ManifestRecord) -> std::io::Result<()>;

    fn skip(&mut self, _notice: &SkipNotice) {}
}

/// Sink that keeps everything in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub records: Vec<ManifestRecord>,
    pub skips: Vec<(SkipKind, PathBuf)>,
}

impl CollectingSink {
    pub fn skips_of(&self, kind: SkipKind) -> Vec<&PathBuf> {
        self.skips
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, p)| p)
            .collect()
    }
}

impl WalkSink for CollectingSink {
    fn record(&mut self, record: ManifestRecord) -> std::io::Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn skip(&mut self, notice: &SkipNotice) {
        self.skips.push((notice.kind(), notice.path().to_path_buf()));
    }
}

/// Opens regular files for binary reading and checks directories before descent
pub trait FileOpener {
    type Reader: Read;

    fn open(&self, path: &Path) -> std::io::Result<Self::Reader>;

    /// Confirm that a directory can be listed before its entries are visited
    fn probe_dir(&self, path: &Path) -> std::io::Result<()> {
        fs::read_dir(path).map(|_| ())
    }
}

/// Opener backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl FileOpener for FsOpener {
    type Reader = File;

    fn open(&self, path: &Path) -> std::io::Result<File> {
        File::open(path)
    }
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Descend into symlinked directories (loops are detected and skipped)
    pub follow_symlinks: bool,
    /// Bytes requested per read; at least one digest block
    pub chunk_size: usize,
    /// Files never fingerprinted, such as the manifest being written
    pub excluded: Vec<PathBuf>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            excluded: Vec::new(),
        }
    }
}

/// Counters for one or more walks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    pub files_hashed: u64,
    pub bytes_hashed: u64,
    pub skipped_unavailable: u64,
    pub skipped_non_regular: u64,
    pub skipped_directories: u64,
    pub read_failures: u64,
}

impl WalkSummary {
    pub fn skipped(&self) -> u64 {
        self.skipped_unavailable
            + self.skipped_non_regular
            + self.skipped_directories
            + self.read_failures
    }

    pub fn merge(&mut self, other: &WalkSummary) {
        self.files_hashed += other.files_hashed;
        self.bytes_hashed += other.bytes_hashed;
        self.skipped_unavailable += other.skipped_unavailable;
        self.skipped_non_regular += other.skipped_non_regular;
        self.skipped_directories += other.skipped_directories;
        self.read_failures += other.read_failures;
    }

    fn count_skip(&mut self, kind: SkipKind) {
        match kind {
            SkipKind::Unavailable => self.skipped_unavailable += 1,
            SkipKind::NonRegular => self.skipped_non_regular += 1,
            SkipKind::DirectoryError => self.skipped_directories += 1,
            SkipKind::ReadFailure => self.read_failures += 1,
        }
    }
}

/// Depth-first filesystem walker
pub struct Walker<O: FileOpener = FsOpener> {
    config: WalkerConfig,
    opener: O,
}

impl Walker<FsOpener> {
    pub fn new(config: WalkerConfig) -> Self {
        Self::with_opener(config, FsOpener)
    }
}

impl<O: FileOpener> Walker<O> {
    /// Create a walker that reads files through `opener`
    pub fn with_opener(config: WalkerConfig, opener: O) -> Self {
        let chunk_size = config.chunk_size.max(BLOCK_SIZE);
        Self {
            config: WalkerConfig { chunk_size, ..config },
            opener,
        }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Skip `path` whenever it is listed as a regular file
    pub fn exclude(&mut self, path: PathBuf) {
        self.config.excluded.push(path);
    }

    /// Walk `root`, emitting one record per regular file and one notice per skip.
    ///
    /// Only a sink write failure returns an error.
    pub fn walk<S>(&self, root: &Path, sink: &mut S) -> Result<WalkSummary, ScanError>
    where
        S: WalkSink + ?Sized,
    {
        let mut summary = WalkSummary::default();

        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                let error = WalkError::DirectoryUnreadable {
                    path: root.to_path_buf(),
                    source: std::io::Error::other("not a directory"),
                };
                report(sink, &mut summary, SkipNotice { error });
                return Ok(summary);
            }
            Err(source) => {
                let error = WalkError::DirectoryUnreadable {
                    path: root.to_path_buf(),
                    source,
                };
                report(sink, &mut summary, SkipNotice { error });
                return Ok(summary);
            }
        }

        debug!(root = %root.display(), follow_symlinks = self.config.follow_symlinks, "Walking root");

        let mut buf = vec![0u8; self.config.chunk_size];
        let mut entries = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .min_depth(1)
            .into_iter();

        while let Some(item) = entries.next() {
            let outcome = match item {
                Ok(entry) => classify(&entry),
                Err(err) => classify_walk_error(err),
            };

            match outcome {
                WalkOutcome::Recurse(path) => match self.opener.probe_dir(&path) {
                    Ok(()) => debug!(path = %path.display(), "Descending into directory"),
                    Err(source) => {
                        entries.skip_current_dir();
                        let error = WalkError::DirectoryUnreadable { path, source };
                        report(sink, &mut summary, SkipNotice { error });
                    }
                },
                WalkOutcome::Hash(path) if self.config.excluded.contains(&path) => {
                    debug!(path = %path.display(), "Excluded file not fingerprinted");
                }
                WalkOutcome::Hash(path) => {
                    self.hash_file(path, sink, &mut buf, &mut summary)?;
                }
                WalkOutcome::SkipUnavailable(error)
                | WalkOutcome::SkipNonRegular(error)
                | WalkOutcome::SkipDirectoryError(error) => {
                    report(sink, &mut summary, SkipNotice { error });
                }
            }
        }

        Ok(summary)
    }

    /// Fingerprint one file and emit its record.
    ///
    /// A file that cannot be read to the end produces a notice, never a record.
    fn hash_file<S>(
        &self,
        path: PathBuf,
        sink: &mut S,
        buf: &mut [u8],
        summary: &mut WalkSummary,
    ) -> Result<(), ScanError>
    where
        S: WalkSink + ?Sized,
    {
        match fs::metadata(&path) {
            Ok(meta) => {
                info!(path = %path.display(), size = %human_size(meta.len()), "Processing file")
            }
            Err(_) => info!(path = %path.display(), "Processing file"),
        }

        let mut reader = match self.opener.open(&path) {
            Ok(reader) => reader,
            Err(source) => {
                let error = WalkError::FileRead { path, source };
                report(sink, summary, SkipNotice { error });
                return Ok(());
            }
        };

        let mut hash = Md5Hash::new();
        let bytes_read = match hash.update_from(&mut reader, buf) {
            Ok(n) => n,
            Err(DigestError::Source(source)) => {
                let error = WalkError::FileRead { path, source };
                report(sink, summary, SkipNotice { error });
                return Ok(());
            }
            Err(DigestError::Finalized) => {
                let error = WalkError::EngineMisuse { path };
                report(sink, summary, SkipNotice { error });
                return Ok(());
            }
        };
        drop(reader);

        let fingerprint = hash.finish();
        trace!(path = %path.display(), blocks = bytes_read / BLOCK_SIZE as u64, "Digest finalized");

        let size_bytes = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Size lookup failed after read; using bytes read");
                bytes_read
            }
        };

        info!(path = %path.display(), fingerprint = %fingerprint, "File hashed");

        let record = ManifestRecord {
            extension: extension_token(&path),
            absolute_path: path,
            size_bytes,
            fingerprint,
        };
        sink.record(record).map_err(ScanError::OutputSink)?;

        summary.files_hashed += 1;
        summary.bytes_hashed += bytes_read;
        Ok(())
    }
}

fn report<S>(sink: &mut S, summary: &mut WalkSummary, notice: SkipNotice)
where
    S: WalkSink + ?Sized,
{
    let kind = notice.kind();
    warn!(path = %notice.path().display(), kind = %kind, error = %notice.error, "Skipping entry");
    summary.count_skip(kind);
    sink.skip(&notice);
}

/// Classify a listed entry after re-checking it on disk
fn classify(entry: &DirEntry) -> WalkOutcome {
    let path = entry.path().to_path_buf();

    // Follows links: a link counts as whatever it resolves to.
    let metadata = match fs::metadata(&path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return WalkOutcome::SkipUnavailable(WalkError::EntryVanished { path });
        }
        Err(source) => {
            return WalkOutcome::SkipUnavailable(WalkError::EntryInaccessible { path, source });
        }
    };

    if metadata.is_dir() {
        // walkdir only descends into links when following them.
        if entry.file_type().is_dir() {
            WalkOutcome::Recurse(path)
        } else {
            WalkOutcome::SkipNonRegular(WalkError::NotRegular {
                path,
                kind: "symlink to directory",
            })
        }
    } else if metadata.is_file() {
        WalkOutcome::Hash(path)
    } else {
        WalkOutcome::SkipNonRegular(WalkError::NotRegular {
            path,
            kind: special_kind(&metadata.file_type()),
        })
    }
}

/// Map a walkdir failure to the entry or subtree it belongs to
fn classify_walk_error(err: walkdir::Error) -> WalkOutcome {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();

    if err.loop_ancestor().is_some() {
        return WalkOutcome::SkipDirectoryError(WalkError::SymlinkLoop { path });
    }

    let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));

    if is_dir {
        WalkOutcome::SkipDirectoryError(WalkError::DirectoryUnreadable { path, source })
    } else if source.kind() == ErrorKind::NotFound {
        WalkOutcome::SkipUnavailable(WalkError::EntryVanished { path })
    } else {
        WalkOutcome::SkipUnavailable(WalkError::EntryInaccessible { path, source })
    }
}

#[cfg(unix)]
fn special_kind(file_type: &fs::FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_fifo() {
        "fifo"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() {
        "block device"
    } else if file_type.is_char_device() {
        "character device"
    } else {
        "special file"
    }
}

#[cfg(not(unix))]
fn special_kind(_file_type: &fs::FileType) -> &'static str {
    "special file"
}
