//! Hint-injection verification.
//!
//! A hint is an externally supplied assertion that overrides the
//! disassembler's own classification heuristic for one address. The protocol
//! here checks that hints actually take effect *and* that the diagnostic
//! output attributes the reclassification to the supplied hint rather than an
//! internal heuristic:
//!
//! 1. baseline: disassemble with no hints, resolve the designated symbol,
//!    assert its address classifies as code;
//! 2. hinted: write an `invalid` hint for that address, disassemble again
//!    with `--debug-dir`/`--hints` forwarded through the pass-through
//!    argument channel, assert the address now classifies as data and that
//!    the debug directory's invalid-locations table contains the hint's
//!    provenance tag.
//!
//! Both invocations are independent and idempotent given the same binary and
//! hints file, so the whole protocol is a single deterministic pass with no
//! retries.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::driver::{self, DriverError, ToolPaths};
use crate::ir::{BlockKind, IrError, IrIndex};

/// One hint line: classification override, target address, provenance tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintRecord {
    pub classification: String,
    pub address: u64,
    pub tag: String,
}

impl HintRecord {
    /// Hint declaring `address` to hold an invalid instruction.
    pub fn invalid(address: u64, tag: impl Into<String>) -> HintRecord {
        HintRecord { classification: "invalid".to_string(), address, tag: tag.into() }
    }
}

/// Write hints in the disassembler's plain-text format: one record per line,
/// tab-separated `<classification>\t<address>\t<tag>`.
pub fn write_hints_file(records: &[HintRecord], path: &Path) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    for rec in records {
        writeln!(file, "{}\t{}\t{}", rec.classification, rec.address, rec.tag)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum HintError {
    #[error("{stage} disassembly failed")]
    DisassemblyFailed { stage: &'static str },
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Ir(#[from] IrError),
    #[error("symbol `{0}` not found in the IR")]
    SymbolNotFound(String),
    #[error("baseline: `{symbol}` at {address:#x} is not classified as code")]
    NotCode { symbol: String, address: u64 },
    #[error("hinted: `{symbol}` at {address:#x} was not reclassified to data")]
    NotReclassified { symbol: String, address: u64 },
    #[error("debug directory has no invalid-locations table at {0}")]
    MissingDiagnostic(PathBuf),
    #[error("invalid-locations table does not mention hint tag `{tag}`")]
    TagMissing { tag: String },
    #[error("i/o error during hint verification: {0}")]
    Io(#[from] std::io::Error),
}

/// Parameters for one run of the protocol. The binary must already exist
/// inside `workdir`.
#[derive(Debug, Clone)]
pub struct HintCheck {
    pub workdir: PathBuf,
    pub binary: String,
    /// Symbol whose referent is asserted code, then hinted invalid.
    pub symbol: String,
    /// Provenance tag expected back in the diagnostic table.
    pub tag: String,
}

/// Run the two-state protocol. Any failed assertion is a verification
/// failure surfaced immediately.
pub fn verify_hint_reclassification(
    check: &HintCheck,
    tools: &ToolPaths,
    timeout: Duration,
) -> Result<(), HintError> {
    let work = check.workdir.as_path();
    let stem = check.binary.rsplit_once('.').map(|(s, _)| s).unwrap_or(&check.binary);
    let ir_name = format!("{stem}.gtirb");

    // Baseline pass: no hints.
    let ok = driver::disassemble(tools, &check.binary, "--ir", &ir_name, &[], work, timeout)?;
    if !ok {
        return Err(HintError::DisassemblyFailed { stage: "baseline" });
    }
    let ir = IrIndex::load(&work.join(&ir_name))?;
    let address =
        ir.find_symbol(&check.symbol).ok_or_else(|| HintError::SymbolNotFound(check.symbol.clone()))?;
    if ir.classify(address) != Some(BlockKind::Code) {
        return Err(HintError::NotCode { symbol: check.symbol.clone(), address });
    }

    // Hinted pass: fresh debug dir, hints file forwarded through the
    // uninterpreted extra-args channel. Both are scoped temporaries.
    let debug_dir = tempfile::Builder::new().prefix("trip-debug-").tempdir()?;
    let hints_dir = tempfile::Builder::new().prefix("trip-hints-").tempdir()?;
    let hints_path = hints_dir.path().join("hints.txt");
    write_hints_file(&[HintRecord::invalid(address, &check.tag)], &hints_path)?;

    let extra = vec![
        "--debug-dir".to_string(),
        debug_dir.path().display().to_string(),
        "--hints".to_string(),
        hints_path.display().to_string(),
    ];
    let ok = driver::disassemble(tools, &check.binary, "--ir", &ir_name, &extra, work, timeout)?;
    if !ok {
        return Err(HintError::DisassemblyFailed { stage: "hinted" });
    }

    let ir = IrIndex::load(&work.join(&ir_name))?;
    let address =
        ir.find_symbol(&check.symbol).ok_or_else(|| HintError::SymbolNotFound(check.symbol.clone()))?;
    if ir.classify(address) != Some(BlockKind::Data) {
        return Err(HintError::NotReclassified { symbol: check.symbol.clone(), address });
    }

    // Provenance: the invalid-locations table must name our tag, proving the
    // reclassification came from the hint and not a heuristic.
    let table = debug_dir.path().join("invalid.csv");
    if !table.is_file() {
        return Err(HintError::MissingDiagnostic(table));
    }
    let body = std::fs::read_to_string(&table)?;
    if !body.contains(&check.tag) {
        return Err(HintError::TagMissing { tag: check.tag.clone() });
    }
    Ok(())
}
