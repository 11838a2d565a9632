//! Behavioral equivalence between the original and reassembled binary.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::{self, ProcessError};

/// How two artifacts are judged equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparePolicy {
    /// Run both binaries under each argument set and require identical exit
    /// code and byte-identical stdout. An empty list means one run with no
    /// arguments.
    Execution {
        #[serde(default)]
        arg_sets: Vec<Vec<String>>,
    },
    /// For artifacts that cannot be run standalone (e.g. shared libraries):
    /// invoke an external harness command with both paths appended; exit 0
    /// means equivalent.
    Harness { command: Vec<String> },
}

impl Default for ComparePolicy {
    fn default() -> ComparePolicy {
        ComparePolicy::Execution { arg_sets: Vec::new() }
    }
}

/// Verdict of one comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Equivalence {
    Matched,
    /// Not equivalent; carries a human-readable description of the first
    /// divergence observed.
    Diverged(String),
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("harness compare policy has an empty command")]
    EmptyHarnessCommand,
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Compare `original` against `reassembled` under `policy`.
///
/// Both paths must be absolute; `cwd` is the working directory the binaries
/// (or the harness) run in. Any divergence in exit code or stdout is
/// non-equivalence; stderr is deliberately not compared, tools are free to
/// warn differently.
pub fn compare(
    original: &Path,
    reassembled: &Path,
    policy: &ComparePolicy,
    cwd: &Path,
    timeout: Duration,
) -> Result<Equivalence, CompareError> {
    match policy {
        ComparePolicy::Execution { arg_sets } => {
            let empty: Vec<String> = Vec::new();
            let sets: Vec<&Vec<String>> =
                if arg_sets.is_empty() { vec![&empty] } else { arg_sets.iter().collect() };
            for args in sets {
                let orig = process::run_command(original, args, cwd, timeout)?;
                let reasm = process::run_command(reassembled, args, cwd, timeout)?;
                if orig.exit_code != reasm.exit_code {
                    return Ok(Equivalence::Diverged(format!(
                        "exit code {} vs {} (args: {:?})",
                        orig.exit_code, reasm.exit_code, args
                    )));
                }
                if orig.stdout != reasm.stdout {
                    return Ok(Equivalence::Diverged(format!(
                        "stdout differs (args: {:?})",
                        args
                    )));
                }
            }
            Ok(Equivalence::Matched)
        }
        ComparePolicy::Harness { command } => {
            let (program, args) =
                command.split_first().ok_or(CompareError::EmptyHarnessCommand)?;
            let mut full: Vec<String> = args.to_vec();
            full.push(original.display().to_string());
            full.push(reassembled.display().to_string());
            let ok = process::run_ok(Path::new(program), &full, cwd, timeout)?;
            if ok {
                Ok(Equivalence::Matched)
            } else {
                Ok(Equivalence::Diverged("harness reported divergence".to_string()))
            }
        }
    }
}
