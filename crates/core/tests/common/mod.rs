//! Shared fixtures for the integration tests: tiny `/bin/sh` stand-ins for
//! the external compiler, disassembler, and reassembler, so the pipeline can
//! be exercised without any real toolchain installed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use roundtrip_core::driver::ToolPaths;
use roundtrip_core::toolchain::{PlatformProfile, TargetOs};

/// Write an executable shell script into `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

/// Fake C compiler: records its arguments to `cc_args.txt` in the working
/// directory and emits a runnable script "binary" that prints a fixed line
/// plus whatever -O flag it was compiled with.
pub fn fake_cc(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-cc",
        r#"echo "$@" > cc_args.txt
out=""
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

/// Fake disassembler: the "IR" is a byte copy of the input binary. Also
/// records its full argument list to `disasm_args.txt`.
pub fn fake_disassembler(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-disasm",
        r#"echo "$@" > disasm_args.txt
cp "$1" "$3"
"#,
    )
}

/// Faithful fake reassembler: `<ir> --binary <out>` copies the IR back into
/// a runnable binary.
pub fn fake_reassembler(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-reasm",
        r#"cp "$1" "$3"
chmod 755 "$3"
"#,
    )
}

/// Buggy fake reassembler: corrupts programs that were built at -O2, leaving
/// every other level intact. Lets tests exercise a divergence at exactly one
/// optimization level.
pub fn fake_reassembler_bad_at_o2(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-reasm-bad",
        r#"sed 's/-O2/-O2-corrupted/' "$1" > "$3"
chmod 755 "$3"
"#,
    )
}

/// Profile whose cc/cxx point at the fake compiler.
pub fn fake_profile(cc: &Path) -> PlatformProfile {
    PlatformProfile {
        os: TargetOs::Linux,
        cc: cc.to_path_buf(),
        cxx: cc.to_path_buf(),
        assembler: "as".to_string(),
    }
}

/// Tool set pointing at the given fakes; missing tools get a path that can
/// never spawn, so tests notice if a stage invokes a tool it should not.
pub fn fake_tools(disassembler: Option<&Path>, reassembler: Option<&Path>) -> ToolPaths {
    let never = PathBuf::from("/nonexistent/tool-should-not-run");
    ToolPaths {
        disassembler: disassembler.map(Path::to_path_buf).unwrap_or_else(|| never.clone()),
        reassembler: reassembler.map(Path::to_path_buf).unwrap_or_else(|| never.clone()),
        make: never,
    }
}

/// Create an example source dir with one trivial C file.
pub fn write_example_sources(dir: &Path) {
    std::fs::create_dir_all(dir).expect("create example dir");
    std::fs::write(dir.join("ex.c"), "int main(void) { return 0; }\n").expect("write source");
}
