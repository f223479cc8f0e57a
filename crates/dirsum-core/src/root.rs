//! Validation of the directory handed to a scan.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Make `dir` absolute (`.` and `./foo` become `/cwd` and `/cwd/foo`) and
/// check that it exists and is a directory. Symlinks are not resolved.
pub fn resolve_root(dir: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(dir)
        .with_context(|| format!("cannot expand '{}' to absolute path", dir.display()))?;
    let meta = fs::metadata(&abs).with_context(|| format!("cannot stat '{}'", abs.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", abs.display());
    }
    Ok(abs)
}
