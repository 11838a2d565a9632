#![cfg(unix)]

mod common;

use common::{fake_cc, hint_disassembler, write_script};
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture_with_source(root: &std::path::Path) -> std::path::PathBuf {
    let dir = root.join("ex1");
    std::fs::create_dir_all(&dir).expect("create fixture");
    std::fs::write(dir.join("ex.c"), "int main(void) { return 0; }\n").expect("write source");
    dir
}

/// End-to-end: the command builds the example (binary absent), runs the
/// two-pass protocol, and reports the reclassification plus the binary hash.
#[test]
fn verify_hints_passes_with_compliant_disassembler() {
    let tools = tempdir().expect("tools dir");
    let root = tempdir().expect("fixture root");
    let dir = fixture_with_source(root.path());

    assert_cmd::cargo::cargo_bin_cmd!("reasm-check")
        .env("TRIP_CC", fake_cc(tools.path()))
        .env("TRIP_DISASSEMBLER", hint_disassembler(tools.path()))
        .arg("verify-hints")
        .arg("--example")
        .arg(&dir)
        .arg("--binary")
        .arg("ex")
        .assert()
        .success()
        .stdout(predicate::str::contains("`main` reclassified code -> data"))
        .stdout(predicate::str::contains("binary sha256: "));
}

#[test]
fn verify_hints_fails_when_hint_is_ignored() {
    let tools = tempdir().expect("tools dir");
    let root = tempdir().expect("fixture root");
    let dir = fixture_with_source(root.path());

    // Always reports code, with or without hints.
    let stubborn = write_script(
        tools.path(),
        "disasm-stubborn",
        r#"out="$3"
printf '{"modules":[{"symbols":[{"name":"main","address":4096}],"blocks":[{"address":4096,"size":64,"kind":"code"}]}]}' > "$out"
"#,
    );

    assert_cmd::cargo::cargo_bin_cmd!("reasm-check")
        .env("TRIP_CC", fake_cc(tools.path()))
        .env("TRIP_DISASSEMBLER", stubborn)
        .arg("verify-hints")
        .arg("--example")
        .arg(&dir)
        .arg("--binary")
        .arg("ex")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not reclassified"));
}

#[test]
fn verify_hints_rejects_missing_example_dir() {
    assert_cmd::cargo::cargo_bin_cmd!("reasm-check")
        .arg("verify-hints")
        .arg("--example")
        .arg("/nonexistent/example")
        .arg("--binary")
        .arg("ex")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Example directory not found"));
}
