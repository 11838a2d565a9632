use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use roundtrip_core::suite::Manifest;

pub mod commands;

/// Load a suite manifest from YAML and rebase its relative example
/// directories against the manifest's parent directory.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let mut manifest: Manifest = serde_yaml::from_str(&body)
        .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
    if let Some(base) = path.parent() {
        manifest.resolve_dirs(base);
    }
    Ok(manifest)
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
///
/// Used to record exactly which binary a verification ran against.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open binary for hashing: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read binary for hashing: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(format!("{:x}", digest))
}
