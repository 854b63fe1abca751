//! Shared test utilities for integration tests
//!
//! Builds small directory trees and parses manifest output.

use md5list::tree::walker::FileOpener;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// One parsed manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
    pub path: PathBuf,
    pub extension: String,
    pub size: u64,
    pub fingerprint: String,
}

/// Parse manifest text produced for paths without commas or quotes
pub fn parse_manifest(text: &str) -> Vec<ManifestLine> {
    text.lines()
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 4, "unexpected manifest line: {:?}", line);
            ManifestLine {
                path: PathBuf::from(fields[0]),
                extension: fields[1].to_string(),
                size: fields[2].parse().unwrap(),
                fingerprint: fields[3].to_string(),
            }
        })
        .collect()
}

/// Write `files` (relative path, contents) below `root`, creating parents
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// Remove all permissions from a directory for the lifetime of the guard.
///
/// Reports whether the directory actually became unreadable; a privileged
/// test runner can still list it.
#[cfg(unix)]
pub struct LockedDir {
    path: PathBuf,
    pub unreadable: bool,
}

#[cfg(unix)]
impl LockedDir {
    pub fn new(path: &Path) -> Self {
        use std::os::unix::fs::PermissionsExt;

        fs::create_dir_all(path).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        let unreadable = fs::read_dir(path).is_err();
        Self {
            path: path.to_path_buf(),
            unreadable,
        }
    }
}

#[cfg(unix)]
impl Drop for LockedDir {
    fn drop(&mut self) {
        use std::os::unix::fs::PermissionsExt;

        let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755));
    }
}

/// Create a named pipe with the system `mkfifo`
#[cfg(unix)]
pub fn make_fifo(path: &Path) {
    let status = std::process::Command::new("mkfifo").arg(path).status().unwrap();
    assert!(status.success(), "mkfifo failed for {}", path.display());
}

/// Opener that refuses to list directories with the given name.
///
/// Stands in for a permission-denied directory regardless of the privileges
/// the tests run with.
pub struct DenyListing(pub &'static str);

impl FileOpener for DenyListing {
    type Reader = File;

    fn open(&self, path: &Path) -> std::io::Result<File> {
        File::open(path)
    }

    fn probe_dir(&self, path: &Path) -> std::io::Result<()> {
        if path.file_name().is_some_and(|n| n == self.0) {
            return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        }
        fs::read_dir(path).map(|_| ())
    }
}
