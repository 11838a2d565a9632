//! Round-trip orchestration: compile, disassemble, reassemble, compare.
//!
//! One round trip covers a single (example, optimization level) pair and runs
//! in its own scoped working directory: the example's sources are copied into
//! a fresh temp dir, every artifact lands there, and the directory is removed
//! on all exit paths when the `TempDir` guard drops. That isolation is what
//! makes running levels or examples in parallel safe without locking.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::compare::{self, ComparePolicy, Equivalence};
use crate::driver::{self, ReassembleOutcome, ReassembleStrategy, ToolPaths};
use crate::toolchain::{self, Example, PlatformProfile, ToolchainError};

/// Shared knobs for one suite run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub tools: ToolPaths,
    pub profile: PlatformProfile,
    /// Per-process timeout applied to every external invocation.
    pub timeout: Duration,
}

impl RunConfig {
    pub fn from_env(timeout: Duration) -> RunConfig {
        RunConfig { tools: ToolPaths::from_env(), profile: PlatformProfile::host(), timeout }
    }
}

/// Terminal state of the comparison stage for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareStage {
    Matched,
    Diverged { reason: String },
    /// Reassembly used the `Skip` strategy; nothing to compare, not a failure.
    Skipped,
    /// An earlier stage failed, so comparison was never attempted.
    NotReached,
}

/// Outcome of one (example, optimization level) round trip.
///
/// Stages are strictly ordered; a `false` stage leaves every later stage
/// untouched (`false` / `NotReached`). An explicit `Skip` strategy reports
/// its stage as vacuously satisfied without performing it.
#[derive(Debug, Clone, Serialize)]
pub struct RoundTripResult {
    pub opt_level: String,
    pub compiled: bool,
    pub disassembled: bool,
    pub reassembled: bool,
    pub comparison: CompareStage,
    /// Tool-level failure detail (spawn failure, timeout), when one occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoundTripResult {
    fn not_attempted(opt_level: &str) -> RoundTripResult {
        RoundTripResult {
            opt_level: opt_level.to_string(),
            compiled: false,
            disassembled: false,
            reassembled: false,
            comparison: CompareStage::NotReached,
            error: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.compiled
            && self.disassembled
            && self.reassembled
            && matches!(self.comparison, CompareStage::Matched | CompareStage::Skipped)
    }
}

#[derive(Debug, Error)]
pub enum RoundTripError {
    #[error("failed to stage example sources from {dir}: {source}")]
    StageSources {
        dir: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Toolchain(ToolchainError),
}

/// Run the full pipeline for one example across the requested optimization
/// levels. Stage failures (including a tool that cannot be started or times
/// out) are folded into the per-level result; only fixture staging problems
/// are hard errors.
pub fn run_round_trip(
    example: &Example,
    opt_levels: &[String],
    strategy: ReassembleStrategy,
    policy: &ComparePolicy,
    config: &RunConfig,
) -> Result<Vec<RoundTripResult>, RoundTripError> {
    let mut results = Vec::with_capacity(opt_levels.len());
    for level in opt_levels {
        results.push(run_one_level(example, level, strategy, policy, config)?);
    }
    Ok(results)
}

/// AND over all recorded levels: a single failing level fails the example.
pub fn overall_verdict(results: &[RoundTripResult]) -> bool {
    !results.is_empty() && results.iter().all(RoundTripResult::passed)
}

fn run_one_level(
    example: &Example,
    opt_level: &str,
    strategy: ReassembleStrategy,
    policy: &ComparePolicy,
    config: &RunConfig,
) -> Result<RoundTripResult, RoundTripError> {
    let mut result = RoundTripResult::not_attempted(opt_level);

    // Scoped working copy; dropped (and deleted) on every exit path.
    let workdir = stage_sources(&example.dir, &example.name)
        .map_err(|source| RoundTripError::StageSources { dir: example.dir.clone(), source })?;
    let work = workdir.path();

    // Stage 1: compile + link.
    match toolchain::build(example, opt_level, &config.profile, work, config.timeout) {
        Ok(true) => result.compiled = true,
        Ok(false) => return Ok(result),
        Err(ToolchainError::Process(e)) => {
            result.error = Some(e.to_string());
            return Ok(result);
        }
        Err(e) => return Err(RoundTripError::Toolchain(e)),
    }

    // Stage 2: disassemble into the intermediate representation.
    let ir_name = format!("{}.gtirb", binary_stem(&example.binary));
    match driver::disassemble(
        &config.tools,
        &example.binary,
        "--ir",
        &ir_name,
        &[],
        work,
        config.timeout,
    ) {
        Ok(true) => result.disassembled = true,
        Ok(false) => return Ok(result),
        Err(driver::DriverError::Process(e)) => {
            result.error = Some(e.to_string());
            return Ok(result);
        }
    }

    // Stage 3: reassemble (or skip).
    let reassembled_name = format!("{}.reassembled", example.binary);
    let outcome = match driver::reassemble(
        &config.tools,
        &ir_name,
        &reassembled_name,
        strategy,
        work,
        config.timeout,
    ) {
        Ok(outcome) => outcome,
        Err(driver::DriverError::Process(e)) => {
            result.error = Some(e.to_string());
            return Ok(result);
        }
    };
    let reassembled_path = match outcome {
        ReassembleOutcome::Skipped => {
            result.reassembled = true;
            result.comparison = CompareStage::Skipped;
            return Ok(result);
        }
        ReassembleOutcome::Failed => return Ok(result),
        ReassembleOutcome::Produced(path) => {
            result.reassembled = true;
            path
        }
    };

    // Stage 4: behavioral comparison.
    let original = work.join(&example.binary);
    match compare::compare(&original, &reassembled_path, policy, work, config.timeout) {
        Ok(Equivalence::Matched) => result.comparison = CompareStage::Matched,
        Ok(Equivalence::Diverged(reason)) => {
            result.comparison = CompareStage::Diverged { reason }
        }
        Err(e) => {
            result.error = Some(e.to_string());
            result.comparison =
                CompareStage::Diverged { reason: "comparison could not run".to_string() };
        }
    }
    Ok(result)
}

fn binary_stem(binary: &str) -> &str {
    binary.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(binary)
}

/// Copy an example's sources into a fresh scoped temp dir. The returned
/// guard deletes the whole tree on drop, on all exit paths.
pub fn stage_sources(dir: &Path, name: &str) -> std::io::Result<tempfile::TempDir> {
    let workdir = tempfile::Builder::new().prefix(&format!("trip-{name}-")).tempdir()?;
    copy_tree(dir, workdir.path())?;
    Ok(workdir)
}

/// Recursively copy the example fixture into the scoped work dir.
fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            std::fs::create_dir_all(&target)?;
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
