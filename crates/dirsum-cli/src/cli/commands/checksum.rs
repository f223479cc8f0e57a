//! Checksum command: compute SHA-256 of a file.

use anyhow::Result;
use dirsum_core::checksum::{self, Encoding};
use std::path::Path;

/// Compute and print SHA-256 of the given file.
pub async fn run_checksum(path: &Path, encoding: Encoding) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{} {}", digest.encode(encoding), path.display());
    Ok(())
}
