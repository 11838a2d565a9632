//! Driver for the external disassembler and reassembler.
//!
//! The driver owns the tool invocations and nothing else: a non-zero exit is
//! reported as stage failure, and tool output is never inspected or corrected
//! here. Correctness of the wrapped tools is judged downstream by the
//! equivalence checker.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::{self, resolve_tool, ProcessError};
use crate::toolchain::TargetOs;

/// Resolved locations of the external tools.
///
/// Precedence: `TRIP_DISASSEMBLER` / `TRIP_REASSEMBLER` / `TRIP_MAKE`
/// environment variables, else the default program name on `PATH`.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub disassembler: PathBuf,
    pub reassembler: PathBuf,
    pub make: PathBuf,
}

impl ToolPaths {
    pub fn from_env() -> ToolPaths {
        let default_make = match TargetOs::current() {
            TargetOs::Linux => "make",
            TargetOs::Windows => "nmake",
        };
        ToolPaths {
            disassembler: resolve_tool("TRIP_DISASSEMBLER", "ddisasm"),
            reassembler: resolve_tool("TRIP_REASSEMBLER", "gtirb-pprinter"),
            make: resolve_tool("TRIP_MAKE", default_make),
        }
    }
}

/// How to turn the intermediate artifact back into a binary.
///
/// A closed set on purpose: each test case declares exactly one of these, and
/// `Skip` is the designed escape hatch for combinations the external tool is
/// known to be unable to reassemble yet. A skipped case is recorded as an
/// expected limitation, never silently folded into a pass or a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReassembleStrategy {
    /// Default external reassembler, emitting the new binary directly.
    #[default]
    Tool,
    /// Drive the example's own build file (e.g. a Makefile) instead, for
    /// targets the default tool cannot link on its own, such as DLLs.
    BuildSystem,
    /// Perform no work and report vacuous success.
    Skip,
}

/// Result of a reassembly attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassembleOutcome {
    /// A new binary exists at this path.
    Produced(PathBuf),
    /// Strategy was `Skip`; there is nothing to compare.
    Skipped,
    /// The tool exited non-zero or produced no output file.
    Failed,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Invoke the external disassembler on `binary` (a file name inside `cwd`),
/// asking for `format` serialization into `ir_out`.
///
/// `extra_args` is an uninterpreted pass-through channel (debug directory,
/// hints file, ...); the driver forwards it untouched.
pub fn disassemble(
    tools: &ToolPaths,
    binary: &str,
    format: &str,
    ir_out: &str,
    extra_args: &[String],
    cwd: &Path,
    timeout: Duration,
) -> Result<bool, DriverError> {
    let mut args: Vec<String> =
        vec![binary.to_string(), format.to_string(), ir_out.to_string()];
    args.extend(extra_args.iter().cloned());
    Ok(process::run_ok(&tools.disassembler, &args, cwd, timeout)?)
}

/// Produce a new binary named `out` from the intermediate artifact `ir`
/// (both file names inside `cwd`) using the given strategy.
pub fn reassemble(
    tools: &ToolPaths,
    ir: &str,
    out: &str,
    strategy: ReassembleStrategy,
    cwd: &Path,
    timeout: Duration,
) -> Result<ReassembleOutcome, DriverError> {
    let produced = cwd.join(out);
    let ok = match strategy {
        ReassembleStrategy::Skip => return Ok(ReassembleOutcome::Skipped),
        ReassembleStrategy::Tool => {
            let args = [ir, "--binary", out];
            process::run_ok(&tools.reassembler, &args, cwd, timeout)?
        }
        ReassembleStrategy::BuildSystem => {
            // The example's build file is expected to consume the artifact
            // and emit the target named `out`.
            let args = [out];
            process::run_ok(&tools.make, &args, cwd, timeout)?
        }
    };
    if ok && produced.is_file() {
        Ok(ReassembleOutcome::Produced(produced))
    } else {
        Ok(ReassembleOutcome::Failed)
    }
}
