//! `dirsum config` – show where the config lives and what is in effect.

use anyhow::Result;
use dirsum_core::config::DirsumConfig;
use std::path::Path;

pub fn run_config(cfg: &DirsumConfig, path: &Path) -> Result<()> {
    println!("# {}", path.display());
    print!("{}", cfg.to_toml()?);
    Ok(())
}
