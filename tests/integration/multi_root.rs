//! Runs over several roots, some of which do not exist

use super::test_utils::{parse_manifest, write_tree};
use md5list::config::ScanConfig;
use md5list::manifest::CsvManifest;
use md5list::scan::Scanner;
use tempfile::TempDir;

#[test]
fn test_missing_root_reported_valid_root_scanned() {
    let temp_dir = TempDir::new().unwrap();
    let valid = temp_dir.path().join("valid");
    write_tree(&valid, &[("only.txt", b"abc")]);
    let missing = temp_dir.path().join("does-not-exist");

    let mut manifest = CsvManifest::new(Vec::new());
    let summary = Scanner::new(&ScanConfig::default())
        .run(&[missing.clone(), valid.clone()], &mut manifest)
        .unwrap();

    assert_eq!(summary.missing_roots, vec![missing]);
    assert_eq!(summary.totals.files_hashed, 1);

    let text = String::from_utf8(manifest.into_inner().unwrap()).unwrap();
    let lines = parse_manifest(&text);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].path.is_absolute());
    assert!(lines[0].path.ends_with("valid/only.txt"));
    assert_eq!(lines[0].extension, ".txt");
    assert_eq!(lines[0].size, 3);
    assert_eq!(lines[0].fingerprint, "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_all_roots_missing_is_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let roots = [temp_dir.path().join("x"), temp_dir.path().join("y")];

    let mut manifest = CsvManifest::new(Vec::new());
    let summary = Scanner::new(&ScanConfig::default())
        .run(&roots, &mut manifest)
        .unwrap();

    assert_eq!(summary.missing_roots.len(), 2);
    assert_eq!(manifest.records(), 0);
}

#[test]
fn test_same_root_twice_emits_records_twice() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("r");
    write_tree(&root, &[("f.md", b"# title")]);

    let mut manifest = CsvManifest::new(Vec::new());
    Scanner::new(&ScanConfig::default())
        .run(&[&root, &root], &mut manifest)
        .unwrap();

    let text = String::from_utf8(manifest.into_inner().unwrap()).unwrap();
    let lines = parse_manifest(&text);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], lines[1]);
}
