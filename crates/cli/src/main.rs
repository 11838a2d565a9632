use anyhow::Result;
use clap::{Parser, Subcommand};

use reasm_check::commands::{list_cases_command, run_suite_command, verify_hints_command};

/// Differential round-trip verification for disassembler/reassembler
/// pipelines.
///
/// This CLI is a thin wrapper around `roundtrip-core` (exposed in code as
/// `roundtrip_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "reasm-check",
    version,
    about = "Round-trip verification harness for binary disassemblers",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every case declared in a suite manifest.
    ///
    /// For each case this compiles the example at each requested optimization
    /// level, disassembles it, reassembles it under the case's strategy, and
    /// compares the result against the original. The process exits non-zero
    /// if any case fails.
    Run {
        /// Path to the YAML suite manifest.
        #[arg(long)]
        manifest: String,

        /// Run only the case with this name.
        #[arg(long)]
        case: Option<String>,

        /// Emit the full JSON report instead of per-case lines.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Wall-clock timeout, in seconds, for each external process.
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },

    /// List the cases a manifest declares, with their platform gating.
    List {
        /// Path to the YAML suite manifest.
        #[arg(long)]
        manifest: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Verify that a user-supplied hint reclassifies a code location to data.
    ///
    /// Disassembles the example's binary, resolves the symbol's address,
    /// re-disassembles with an `invalid` hint for that address, and checks
    /// both the reclassification and the provenance tag in the debug
    /// directory's invalid-locations table.
    VerifyHints {
        /// Directory holding the example's sources (and binary, if built).
        #[arg(long)]
        example: String,

        /// Name of the binary inside the example directory.
        #[arg(long)]
        binary: String,

        /// Symbol whose referent is asserted code, then hinted invalid.
        #[arg(long, default_value = "main")]
        symbol: String,

        /// Provenance tag to attach to the hint and expect back in the
        /// diagnostic output.
        #[arg(long, default_value = "user-provided-hint")]
        tag: String,

        /// Wall-clock timeout, in seconds, for each external process.
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { manifest, case, json, timeout_secs } => {
            run_suite_command(&manifest, case.as_deref(), json, timeout_secs)?
        }
        Command::List { manifest, json } => list_cases_command(&manifest, json)?,
        Command::VerifyHints { example, binary, symbol, tag, timeout_secs } => {
            verify_hints_command(&example, &binary, &symbol, &tag, timeout_secs)?
        }
    }

    Ok(())
}
