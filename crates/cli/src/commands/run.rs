use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::load_manifest;
use roundtrip_core::roundtrip::{CompareStage, RunConfig};
use roundtrip_core::suite::{self, CaseReport, SuiteReport, Verdict};

/// Run the whole suite (or one named case) from a manifest.
///
/// Exits non-zero, via the returned error, iff any case fails. Platform-gated
/// cases and declared expected limitations never fail the run.
pub fn run_suite_command(
    manifest_path: &str,
    case_filter: Option<&str>,
    json: bool,
    timeout_secs: u64,
) -> Result<()> {
    let mut manifest = load_manifest(Path::new(manifest_path))?;
    if let Some(name) = case_filter {
        manifest.cases.retain(|c| c.example.name == name);
        if manifest.cases.is_empty() {
            bail!("No case named `{name}` in {manifest_path}");
        }
    }

    let config = RunConfig::from_env(Duration::from_secs(timeout_secs));
    let report = suite::run_suite(&manifest, &config);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_report(&report);
    }

    if report.failed() {
        bail!("{} case(s) failed", report.count(Verdict::Failed));
    }
    Ok(())
}

fn print_report(report: &SuiteReport) {
    for case in &report.cases {
        match case.verdict {
            Verdict::Passed => println!("PASS  {}", case.name),
            Verdict::ExpectedLimitation => println!("XFAIL {} (declared limitation)", case.name),
            Verdict::SkippedPlatform => println!("SKIP  {} (platform mismatch)", case.name),
            Verdict::Failed => println!("FAIL  {}{}", case.name, failure_detail(case)),
        }
    }
    println!(
        "{} passed, {} failed, {} skipped, {} expected limitations",
        report.count(Verdict::Passed),
        report.count(Verdict::Failed),
        report.count(Verdict::SkippedPlatform),
        report.count(Verdict::ExpectedLimitation),
    );
}

/// One-line root cause for a failed case: the first stage that gave out, at
/// the first optimization level that hit it.
fn failure_detail(case: &CaseReport) -> String {
    if let Some(err) = &case.error {
        return format!(" ({err})");
    }
    for level in &case.levels {
        if level.passed() {
            continue;
        }
        let stage = if !level.compiled {
            "build failed".to_string()
        } else if !level.disassembled {
            "disassembly failed".to_string()
        } else if !level.reassembled {
            "reassembly failed".to_string()
        } else {
            match &level.comparison {
                CompareStage::Diverged { reason } => format!("not equivalent: {reason}"),
                _ => "comparison failed".to_string(),
            }
        };
        let detail = level.error.as_deref().map(|e| format!("; {e}")).unwrap_or_default();
        return format!(" ({}: {stage}{detail})", level.opt_level);
    }
    String::new()
}
