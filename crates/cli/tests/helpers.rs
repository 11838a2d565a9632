use std::path::Path;

use reasm_check::{load_manifest, sha256_file};
use tempfile::tempdir;

#[test]
fn sha256_file_hashes_known_content() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("bin");
    std::fs::write(&path, b"abc").expect("write");

    // SHA-256("abc"), fixed by the spec of the hash function.
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn sha256_file_fails_for_missing_file() {
    let err = sha256_file(Path::new("/nonexistent/bin")).expect_err("missing file");
    assert!(err.to_string().contains("Failed to open binary"));
}

#[test]
fn load_manifest_rebases_relative_dirs_against_manifest_location() {
    let tmp = tempdir().expect("tempdir");
    let manifest_path = tmp.path().join("suite.yaml");
    std::fs::write(
        &manifest_path,
        r#"
cases:
  - name: ex1
    dir: fixtures/ex1
    binary: ex
    optimization_levels: ["-O0"]
"#,
    )
    .expect("write manifest");

    let manifest = load_manifest(&manifest_path).expect("load");
    assert_eq!(manifest.cases[0].example.dir, tmp.path().join("fixtures/ex1"));
}

#[test]
fn load_manifest_reports_yaml_errors_with_path() {
    let tmp = tempdir().expect("tempdir");
    let manifest_path = tmp.path().join("suite.yaml");
    std::fs::write(&manifest_path, "cases: {broken").expect("write manifest");

    let err = load_manifest(&manifest_path).expect_err("bad yaml");
    assert!(err.to_string().contains("Failed to parse manifest"));
}
