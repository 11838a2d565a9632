use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::sha256_file;
use roundtrip_core::driver::ToolPaths;
use roundtrip_core::hints::{verify_hint_reclassification, HintCheck};
use roundtrip_core::roundtrip::stage_sources;
use roundtrip_core::toolchain::{self, Example, PlatformProfile, TargetOs};

/// Run the hint-injection protocol against one example.
///
/// The example is staged into a scoped temp dir first; if the binary is not
/// already present there it is built once at the platform's no-optimization
/// level, matching the protocol's baseline conditions.
pub fn verify_hints_command(
    example_dir: &str,
    binary: &str,
    symbol: &str,
    tag: &str,
    timeout_secs: u64,
) -> Result<()> {
    let dir = Path::new(example_dir);
    if !dir.is_dir() {
        bail!("Example directory not found: {example_dir}");
    }
    let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("example");
    let timeout = Duration::from_secs(timeout_secs);

    let workdir = stage_sources(dir, name)
        .with_context(|| format!("Failed to stage example sources from {example_dir}"))?;
    let staged_binary = workdir.path().join(binary);

    if !staged_binary.is_file() {
        let profile = PlatformProfile::host();
        let opt_level = match profile.os {
            TargetOs::Linux => "-O0",
            TargetOs::Windows => "/Od",
        };
        let example = Example {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            binary: binary.to_string(),
            compile_flags: Vec::new(),
            link_flags: Vec::new(),
            assembler: None,
        };
        let ok = toolchain::build(&example, opt_level, &profile, workdir.path(), timeout)
            .context("Build failed to start")?;
        if !ok {
            bail!("Failed to build {binary} from {example_dir}");
        }
    }

    let hash = sha256_file(&staged_binary)?;
    let check = HintCheck {
        workdir: workdir.path().to_path_buf(),
        binary: binary.to_string(),
        symbol: symbol.to_string(),
        tag: tag.to_string(),
    };
    verify_hint_reclassification(&check, &ToolPaths::from_env(), timeout)
        .context("Hint verification failed")?;

    println!("hint verification passed: `{symbol}` reclassified code -> data");
    println!("binary sha256: {hash}");
    Ok(())
}
