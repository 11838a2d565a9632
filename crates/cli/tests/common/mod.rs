//! Shared scaffolding for CLI tests: fake external tools and a ready-made
//! suite layout (manifest + example fixture) in a tempdir.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

/// Fake compiler: emits a runnable script binary echoing its -O flag.
pub fn fake_cc(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-cc",
        r#"out=""
opt=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    -O*) opt="$1"; shift ;;
    *) shift ;;
  esac
done
printf '#!/bin/sh\necho program-output %s\n' "$opt" > "$out"
chmod 755 "$out"
"#,
    )
}

/// Fake disassembler: IR is a byte copy of the binary.
pub fn fake_disassembler(dir: &Path) -> PathBuf {
    write_script(dir, "fake-disasm", "cp \"$1\" \"$3\"\n")
}

/// Faithful fake reassembler.
pub fn fake_reassembler(dir: &Path) -> PathBuf {
    write_script(dir, "fake-reasm", "cp \"$1\" \"$3\"\nchmod 755 \"$3\"\n")
}

/// Fake reassembler that corrupts every program it touches.
pub fn broken_reassembler(dir: &Path) -> PathBuf {
    write_script(dir, "fake-reasm-bad", "printf '#!/bin/sh\\necho wrong\\n' > \"$3\"\nchmod 755 \"$3\"\n")
}

/// Hint-aware fake disassembler for the verify-hints command: code at
/// baseline, data plus an invalid.csv entry once a hint arrives.
pub fn hint_disassembler(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-disasm-hints",
        r#"bin="$1"; shift
fmt="$1"; shift
out="$1"; shift
hints=""
debug=""
while [ $# -gt 0 ]; do
  case "$1" in
    --hints) hints="$2"; shift 2 ;;
    --debug-dir) debug="$2"; shift 2 ;;
    *) shift ;;
  esac
done
if [ -z "$hints" ]; then
  printf '{"modules":[{"symbols":[{"name":"main","address":4096}],"blocks":[{"address":4096,"size":64,"kind":"code"}]}]}' > "$out"
else
  addr=$(cut -f2 "$hints" | head -n 1)
  tag=$(cut -f3 "$hints" | head -n 1)
  printf '{"modules":[{"symbols":[{"name":"main","address":%s}],"blocks":[{"address":%s,"size":64,"kind":"data"}]}]}' "$addr" "$addr" > "$out"
  if [ -n "$debug" ]; then
    printf 'address,cause\n%s,%s\n' "$addr" "$tag" > "$debug/invalid.csv"
  fi
fi
"#,
    )
}

/// Lay out a suite root: `suite.yaml` plus an `ex1/` fixture with one C
/// source. Returns (root, manifest path).
pub fn write_suite(root: &Path, manifest_yaml: &str) -> PathBuf {
    let fixture = root.join("ex1");
    std::fs::create_dir_all(&fixture).expect("create fixture");
    std::fs::write(fixture.join("ex.c"), "int main(void) { return 0; }\n").expect("write source");
    let manifest = root.join("suite.yaml");
    std::fs::write(&manifest, manifest_yaml).expect("write manifest");
    manifest
}

pub const PASSING_MANIFEST: &str = r#"
cases:
  - name: ex1
    dir: ex1
    binary: ex
    optimization_levels: ["-O0", "-O1"]
    platform: linux
"#;
