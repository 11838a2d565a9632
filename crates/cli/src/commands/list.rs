use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::load_manifest;
use roundtrip_core::suite::CaseSpec;
use roundtrip_core::toolchain::TargetOs;

#[derive(Serialize)]
struct CaseListing<'a> {
    name: &'a str,
    dir: String,
    levels: &'a [String],
    strategy: &'a roundtrip_core::driver::ReassembleStrategy,
    runnable_here: bool,
}

/// List the cases a manifest declares, marking which ones the current host
/// would actually run versus skip on its platform gate.
pub fn list_cases_command(manifest_path: &str, json: bool) -> Result<()> {
    let manifest = load_manifest(Path::new(manifest_path))?;
    let host = TargetOs::current();

    if json {
        let listings: Vec<CaseListing> = manifest.cases.iter().map(|c| listing(c, host)).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&listings).context("Failed to serialize case list")?
        );
        return Ok(());
    }

    for case in &manifest.cases {
        let l = listing(case, host);
        let gate = if l.runnable_here { "" } else { "  [skipped on this platform]" };
        println!(
            "{}  ({} levels, strategy {:?}){}",
            l.name,
            l.levels.len(),
            case.strategy,
            gate
        );
    }
    println!("{} case(s)", manifest.cases.len());
    Ok(())
}

fn listing(case: &CaseSpec, host: TargetOs) -> CaseListing<'_> {
    CaseListing {
        name: &case.example.name,
        dir: case.example.dir.display().to_string(),
        levels: &case.optimization_levels,
        strategy: &case.strategy,
        runnable_here: case.platform.matches(host),
    }
}
