//! `dirsum scan` – checksum a directory tree and print the sorted report.

use anyhow::{Context, Result};
use dirsum_core::checksum::Encoding;
use dirsum_core::config::DirsumConfig;
use dirsum_core::root::resolve_root;
use dirsum_core::scan::{ScanOptions, ScanStats, Scanner};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Command-line overrides for a scan; `None` falls back to the config.
#[derive(Debug, Clone, Default)]
pub struct ScanArgs {
    pub jobs: Option<usize>,
    pub encoding: Option<Encoding>,
    pub follow_links: bool,
    pub progress: bool,
}

pub async fn run_scan(cfg: &DirsumConfig, dir: &Path, args: &ScanArgs) -> Result<()> {
    let root = resolve_root(dir)?;

    let mut options = ScanOptions::from(cfg);
    if let Some(jobs) = args.jobs {
        options.concurrency = jobs.max(1);
    }
    options.follow_links |= args.follow_links;
    let encoding = args.encoding.unwrap_or(cfg.encoding);

    let stats = Arc::new(ScanStats::new());
    let scanner = Scanner::new(options).with_observer(stats.clone());

    let progress_handle = args.progress.then(|| {
        let stats = Arc::clone(&stats);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(PROGRESS_INTERVAL_MS)).await;
                let p = stats.snapshot();
                eprint!(
                    "\r  {} files  {:.1} MiB  {:.0} files/s  {} in flight  ",
                    p.hashed,
                    p.bytes as f64 / 1_048_576.0,
                    p.files_per_sec(),
                    p.in_flight
                );
            }
        })
    });

    let result = scanner.run(&root).await;

    if let Some(handle) = progress_handle {
        handle.abort();
        eprintln!();
    }

    let entries =
        result.with_context(|| format!("could not calculate checksums of {}", root.display()))?;

    let mut out = io::stdout().lock();
    for entry in &entries {
        writeln!(out, "{}", entry.render(encoding))?;
    }
    out.flush()?;

    let p = stats.snapshot();
    tracing::info!(
        files = p.hashed,
        bytes = p.bytes,
        peak_in_flight = p.peak_in_flight,
        files_per_sec = p.files_per_sec(),
        "scan of {} finished",
        root.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scan_rejects_regular_file_root() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let err = run_scan(&DirsumConfig::default(), f.path(), &ScanArgs::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[tokio::test]
    async fn scan_of_empty_directory_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let args = ScanArgs {
            jobs: Some(2),
            ..ScanArgs::default()
        };
        run_scan(&DirsumConfig::default(), dir.path(), &args)
            .await
            .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn scan_error_carries_context() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("broken")).unwrap();

        let err = run_scan(&DirsumConfig::default(), dir.path(), &ScanArgs::default())
            .await
            .unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("could not calculate checksums"));
        assert!(msg.contains("broken"));
    }
}
