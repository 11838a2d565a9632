//! Toolchain adapter: turn an abstract build request into concrete
//! compiler/linker invocations for the host platform.
//!
//! The adapter is deliberately dumb about flags. Optimization levels and
//! example-supplied flags are injected verbatim; a flag the chosen compiler
//! does not understand simply surfaces as a build failure.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::{self, resolve_tool, ProcessError};

/// One test program: a directory of sources plus the build directives that
/// came with it. Supplied externally as fixture data, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub name: String,
    /// Directory holding the sources, relative to the manifest or absolute.
    pub dir: PathBuf,
    /// Name of the output binary, e.g. `ex.exe` or `ex`.
    pub binary: String,
    /// Extra compiler flags specific to this example.
    #[serde(default)]
    pub compile_flags: Vec<String>,
    /// Linker directives (entry point, subsystem, output kind). Appended only
    /// when present; absent directives use toolchain defaults.
    #[serde(default)]
    pub link_flags: Vec<String>,
    /// Architecture-specific assembler identifier, e.g. `ml64` or `as`.
    #[serde(default)]
    pub assembler: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOs {
    Linux,
    Windows,
}

impl TargetOs {
    /// The platform this harness is running on.
    pub fn current() -> TargetOs {
        if cfg!(windows) {
            TargetOs::Windows
        } else {
            TargetOs::Linux
        }
    }
}

/// Compiler family + assembler for one platform.
///
/// `TRIP_CC` / `TRIP_CXX` override the compiler executables, following the
/// same env-override convention the external tool paths use.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub os: TargetOs,
    pub cc: PathBuf,
    pub cxx: PathBuf,
    pub assembler: String,
}

impl PlatformProfile {
    /// GNU-style pair of C/C++ compilers (Linux).
    pub fn gnu() -> PlatformProfile {
        PlatformProfile {
            os: TargetOs::Linux,
            cc: resolve_tool("TRIP_CC", "gcc"),
            cxx: resolve_tool("TRIP_CXX", "g++"),
            assembler: "as".to_string(),
        }
    }

    /// Single unified MSVC compiler (Windows).
    pub fn msvc() -> PlatformProfile {
        PlatformProfile {
            os: TargetOs::Windows,
            cc: resolve_tool("TRIP_CC", "cl"),
            cxx: resolve_tool("TRIP_CXX", "cl"),
            assembler: "ml64".to_string(),
        }
    }

    /// Profile matching the host platform.
    pub fn host() -> PlatformProfile {
        match TargetOs::current() {
            TargetOs::Linux => PlatformProfile::gnu(),
            TargetOs::Windows => PlatformProfile::msvc(),
        }
    }
}

/// A resolved, one-shot compile+link command line for a specific
/// (example, optimization level, platform) combination. Discarded after use.
#[derive(Debug, Clone)]
pub struct BuildSpec {
    pub compiler: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Path the binary will land at, inside `cwd`.
    pub output: PathBuf,
}

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("no C/C++ sources found in {0}")]
    NoSources(PathBuf),
    #[error("failed to list sources in {dir}: {source}")]
    ListSources {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl BuildSpec {
    /// Resolve the command line for building `example` at `opt_level` inside
    /// `source_dir` (the scoped working copy of the example's sources).
    ///
    /// Any `.cpp` source upgrades the driver from cc to cxx; the optimization
    /// flag goes in verbatim; link directives are appended last, only when the
    /// example carries any.
    pub fn resolve(
        example: &Example,
        opt_level: &str,
        profile: &PlatformProfile,
        source_dir: &Path,
    ) -> Result<BuildSpec, ToolchainError> {
        let (c_sources, cpp_sources) = discover_sources(source_dir)?;
        if c_sources.is_empty() && cpp_sources.is_empty() {
            return Err(ToolchainError::NoSources(source_dir.to_path_buf()));
        }
        let compiler =
            if cpp_sources.is_empty() { profile.cc.clone() } else { profile.cxx.clone() };

        let mut args: Vec<String> = Vec::new();
        args.extend(c_sources);
        args.extend(cpp_sources);
        args.push(opt_level.to_string());
        args.extend(example.compile_flags.iter().cloned());
        match profile.os {
            TargetOs::Linux => {
                args.push("-o".to_string());
                args.push(example.binary.clone());
            }
            TargetOs::Windows => {
                args.push(format!("/Fe:{}", example.binary));
            }
        }
        // MSVC requires /link and friends after everything else; on GNU the
        // linker flags are ordinary trailing arguments.
        args.extend(example.link_flags.iter().cloned());

        Ok(BuildSpec {
            compiler,
            args,
            cwd: source_dir.to_path_buf(),
            output: source_dir.join(&example.binary),
        })
    }

    /// Run the resolved command. Non-zero compiler/linker exit is a build
    /// failure; no partial binaries are considered usable.
    pub fn run(&self, timeout: Duration) -> Result<bool, ToolchainError> {
        let ok = process::run_ok(&self.compiler, &self.args, &self.cwd, timeout)?;
        Ok(ok && self.output.is_file())
    }
}

/// Compile and link `example` at `opt_level` in `source_dir`.
pub fn build(
    example: &Example,
    opt_level: &str,
    profile: &PlatformProfile,
    source_dir: &Path,
    timeout: Duration,
) -> Result<bool, ToolchainError> {
    BuildSpec::resolve(example, opt_level, profile, source_dir)?.run(timeout)
}

/// Collect `.c` and `.cpp` file names in `dir`, each list sorted so command
/// lines are deterministic across runs.
fn discover_sources(dir: &Path) -> Result<(Vec<String>, Vec<String>), ToolchainError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|source| ToolchainError::ListSources { dir: dir.to_path_buf(), source })?;
    let mut c_sources = Vec::new();
    let mut cpp_sources = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|source| ToolchainError::ListSources { dir: dir.to_path_buf(), source })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".c") {
            c_sources.push(name);
        } else if name.ends_with(".cpp") || name.ends_with(".cc") {
            cpp_sources.push(name);
        }
    }
    c_sources.sort();
    cpp_sources.sort();
    Ok((c_sources, cpp_sources))
}
