use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum::{Encoding, DEFAULT_BUF_SIZE};

/// Default number of files hashed concurrently.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Global configuration loaded from `~/.config/dirsum/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirsumConfig {
    /// Maximum number of files hashed at the same time.
    pub concurrency: usize,
    /// Read buffer size in bytes used when streaming a file into the hasher.
    #[serde(default = "default_buffer_bytes")]
    pub buffer_bytes: usize,
    /// Digest text encoding for report lines: "hex" (default) or "base64".
    #[serde(default)]
    pub encoding: Encoding,
    /// Descend into symlinked directories. Link cycles are reported as walk errors.
    #[serde(default)]
    pub follow_links: bool,
}

fn default_buffer_bytes() -> usize {
    DEFAULT_BUF_SIZE
}

impl DirsumConfig {
    /// Render as the TOML that `load_from` accepts.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for DirsumConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            buffer_bytes: DEFAULT_BUF_SIZE,
            encoding: Encoding::Hex,
            follow_links: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dirsum")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DirsumConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DirsumConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from a specific file.
pub fn load_from(path: &Path) -> Result<DirsumConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: DirsumConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
