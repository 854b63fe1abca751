//! Walks over trees containing entries that cannot be hashed
//!
//! The walk must finish, emit records only for readable regular files and
//! report every other entry exactly once.

use super::test_utils::write_tree;
use md5list::digest::md5_hex;
use md5list::tree::walker::{CollectingSink, SkipKind, Walker, WalkerConfig};
use std::fs;
use tempfile::TempDir;

#[cfg(unix)]
#[test]
fn test_walk_survives_unreadable_dangling_and_special_entries() {
    use super::test_utils::{make_fifo, DenyListing};
    use std::os::unix::net::UnixListener;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write_tree(root, &[("normal.txt", b"hello"), ("locked/secret.txt", b"s")]);
    std::os::unix::fs::symlink(root.join("missing-target"), root.join("dangling")).unwrap();
    let _listener = UnixListener::bind(root.join("control.sock")).unwrap();
    make_fifo(&root.join("pipe"));

    let mut sink = CollectingSink::default();
    let summary = Walker::with_opener(WalkerConfig::default(), DenyListing("locked"))
        .walk(root, &mut sink)
        .unwrap();

    assert_eq!(sink.records.len(), 1);
    let record = &sink.records[0];
    assert!(record.absolute_path.ends_with("normal.txt"));
    assert_eq!(record.extension, ".txt");
    assert_eq!(record.size_bytes, 5);
    assert_eq!(record.fingerprint, md5_hex(b"hello"));

    let unavailable = sink.skips_of(SkipKind::Unavailable);
    assert_eq!(unavailable.len(), 1);
    assert!(unavailable[0].ends_with("dangling"));
    assert_eq!(sink.skips_of(SkipKind::NonRegular).len(), 2);
    let dirs = sink.skips_of(SkipKind::DirectoryError);
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].ends_with("locked"));

    assert_eq!(sink.skips.len(), 4);
    assert_eq!(summary.skipped(), 4);
}

#[cfg(unix)]
#[test]
fn test_named_pipe_is_skipped_without_opening() {
    use super::test_utils::make_fifo;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_tree(root, &[("a.txt", b"a")]);
    make_fifo(&root.join("pipe"));

    // Opening a pipe with no writer would block; the walk must return.
    let mut sink = CollectingSink::default();
    let summary = Walker::new(WalkerConfig::default())
        .walk(root, &mut sink)
        .unwrap();

    assert_eq!(sink.records.len(), 1);
    assert!(sink.records[0].absolute_path.ends_with("a.txt"));
    assert_eq!(sink.skips.len(), 1);
    let (kind, path) = &sink.skips[0];
    assert_eq!(*kind, SkipKind::NonRegular);
    assert!(path.ends_with("pipe"));
    assert_eq!(summary.skipped_non_regular, 1);
}

#[cfg(unix)]
#[test]
fn test_permission_denied_directory_is_reported_once() {
    use super::test_utils::LockedDir;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_tree(root, &[("normal.txt", b"hello")]);
    let locked = LockedDir::new(&root.join("locked"));

    let mut sink = CollectingSink::default();
    Walker::new(WalkerConfig::default())
        .walk(root, &mut sink)
        .unwrap();

    assert_eq!(sink.records.len(), 1);
    if locked.unreadable {
        let dirs = sink.skips_of(SkipKind::DirectoryError);
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with("locked"));
        assert_eq!(sink.skips.len(), 1);
    } else {
        // Privileged runners can list the directory; it is simply empty.
        assert!(sink.skips.is_empty());
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_subtree_does_not_hide_siblings() {
    use super::test_utils::LockedDir;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write_tree(
        root,
        &[
            ("a/one.bin", b"1"),
            ("c/two.bin", b"22"),
            ("c/d/three.bin", b"333"),
        ],
    );
    let _locked = LockedDir::new(&root.join("b"));

    let mut sink = CollectingSink::default();
    Walker::new(WalkerConfig::default())
        .walk(root, &mut sink)
        .unwrap();

    let mut names: Vec<String> = sink
        .records
        .iter()
        .map(|r| r.absolute_path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["one.bin", "three.bin", "two.bin"]);
}

#[test]
fn test_records_follow_depth_first_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_tree(
        root,
        &[
            ("a/x.txt", b"x"),
            ("a/sub/y.txt", b"y"),
            ("a/sub/deeper/w.txt", b"w"),
            ("b/z.txt", b"z"),
        ],
    );

    let mut sink = CollectingSink::default();
    Walker::new(WalkerConfig::default())
        .walk(root, &mut sink)
        .unwrap();
    assert_eq!(sink.records.len(), 4);

    // A subtree is finished before its siblings are visited.
    for subtree in ["a", "a/sub"] {
        let positions: Vec<usize> = sink
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.absolute_path.starts_with(root.join(subtree)))
            .map(|(i, _)| i)
            .collect();
        let span = positions.last().unwrap() - positions.first().unwrap() + 1;
        assert_eq!(span, positions.len(), "subtree {} interleaved", subtree);
    }
}

#[test]
fn test_empty_file_and_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("empty_dir")).unwrap();
    write_tree(root, &[("empty.dat", b"")]);

    let mut sink = CollectingSink::default();
    let summary = Walker::new(WalkerConfig::default())
        .walk(root, &mut sink)
        .unwrap();

    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].size_bytes, 0);
    assert_eq!(sink.records[0].fingerprint, "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(summary.skipped(), 0);
}
