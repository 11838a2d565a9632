//! Test-case enumeration and suite-level aggregation.
//!
//! Cases are pure data: which example, which optimization levels, which
//! reassembly strategy, which comparison policy, and which platform the case
//! is meaningful on. Known-unreassemblable combinations appear here as their
//! own explicitly declared `skip`-strategy cases, so both possible
//! regressions ("it now fails" and "it now succeeds") stay visible.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::compare::ComparePolicy;
use crate::driver::ReassembleStrategy;
use crate::roundtrip::{self, RoundTripResult, RunConfig};
use crate::toolchain::{Example, TargetOs};

/// Platform requirement for a case. A mismatch skips the case, it never
/// fails it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformGate {
    #[default]
    Any,
    Linux,
    Windows,
}

impl PlatformGate {
    pub fn matches(&self, os: TargetOs) -> bool {
        match self {
            PlatformGate::Any => true,
            PlatformGate::Linux => os == TargetOs::Linux,
            PlatformGate::Windows => os == TargetOs::Windows,
        }
    }
}

/// One declared round-trip case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSpec {
    #[serde(flatten)]
    pub example: Example,
    pub optimization_levels: Vec<String>,
    #[serde(default)]
    pub strategy: ReassembleStrategy,
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub compare: ComparePolicy,
    #[serde(default)]
    pub platform: PlatformGate,
}

/// Full suite manifest, typically deserialized from YAML by the frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub cases: Vec<CaseSpec>,
}

impl Manifest {
    /// Rebase relative example directories against the manifest's own
    /// location, so a manifest can be run from anywhere.
    pub fn resolve_dirs(&mut self, base: &Path) {
        for case in &mut self.cases {
            if case.example.dir.is_relative() {
                case.example.dir = base.join(&case.example.dir);
            }
        }
    }
}

/// Per-case verdict categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
    /// The executing platform does not match the case's gate.
    SkippedPlatform,
    /// A `skip`-strategy case that completed its remaining stages: a declared
    /// limitation of the external tool, tracked as its own category.
    ExpectedLimitation,
}

/// Everything recorded about one executed (or gated) case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub verdict: Verdict,
    pub levels: Vec<RoundTripResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: String,
    pub finished_at: String,
}

/// Suite-level report: per-case reports plus enough context to interpret
/// them later (host platform, wall-clock timestamps).
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub platform: TargetOs,
    pub generated_at: String,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// True iff any case failed; drives the process exit code.
    pub fn failed(&self) -> bool {
        self.cases.iter().any(|c| c.verdict == Verdict::Failed)
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.cases.iter().filter(|c| c.verdict == verdict).count()
    }
}

/// Run every case in the manifest sequentially. Each case is fully isolated
/// (own scoped work dirs, no shared mutable state), so callers are free to
/// shard cases across processes instead.
pub fn run_suite(manifest: &Manifest, config: &RunConfig) -> SuiteReport {
    let mut reports = Vec::with_capacity(manifest.cases.len());
    for case in &manifest.cases {
        reports.push(run_case(case, config));
    }
    SuiteReport {
        platform: config.profile.os,
        generated_at: Utc::now().to_rfc3339(),
        cases: reports,
    }
}

/// Run one case: platform gate first, then the round trip across all of its
/// optimization levels. The verdict is the AND over levels, with no partial
/// credit; skip-strategy cases that hold up land in `ExpectedLimitation`.
pub fn run_case(case: &CaseSpec, config: &RunConfig) -> CaseReport {
    let started_at = Utc::now().to_rfc3339();
    if !case.platform.matches(config.profile.os) {
        return CaseReport {
            name: case.example.name.clone(),
            verdict: Verdict::SkippedPlatform,
            levels: Vec::new(),
            error: None,
            started_at: started_at.clone(),
            finished_at: started_at,
        };
    }

    let (verdict, levels, error) = match roundtrip::run_round_trip(
        &case.example,
        &case.optimization_levels,
        case.strategy,
        &case.compare,
        config,
    ) {
        Ok(levels) => {
            let verdict = if roundtrip::overall_verdict(&levels) {
                if case.strategy == ReassembleStrategy::Skip {
                    Verdict::ExpectedLimitation
                } else {
                    Verdict::Passed
                }
            } else {
                Verdict::Failed
            };
            (verdict, levels, None)
        }
        Err(e) => (Verdict::Failed, Vec::new(), Some(e.to_string())),
    };

    CaseReport {
        name: case.example.name.clone(),
        verdict,
        levels,
        error,
        started_at,
        finished_at: Utc::now().to_rfc3339(),
    }
}
