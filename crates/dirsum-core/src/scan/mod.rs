//! Bounded-parallel checksum scan of a directory tree.
//!
//! A single driver walks the tree and dispatches one hashing task per file,
//! with at most `concurrency` tasks running at once. The first task error
//! stops further dispatch; the driver always waits for every dispatched task
//! before returning either the complete sorted result or one error.

mod accumulator;
mod driver;
mod latch;
mod limiter;
mod observer;
mod task;

use std::path::Path;
use std::sync::Arc;

use crate::checksum::{ChecksumEntry, DEFAULT_BUF_SIZE};
use crate::config::{DirsumConfig, DEFAULT_CONCURRENCY};
use crate::error::ScanError;

pub use accumulator::Accumulator;
pub use latch::ErrorLatch;
pub use limiter::{AdmissionToken, Limiter};
pub use observer::{NoopObserver, ScanObserver, ScanProgress, ScanStats};

/// Runtime knobs for one [`Scanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum hashing tasks in flight (clamped to at least 1).
    pub concurrency: usize,
    /// Read buffer per task, in bytes.
    pub buffer_bytes: usize,
    /// Descend into symlinked directories.
    pub follow_links: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            buffer_bytes: DEFAULT_BUF_SIZE,
            follow_links: false,
        }
    }
}

impl From<&DirsumConfig> for ScanOptions {
    fn from(cfg: &DirsumConfig) -> Self {
        Self {
            concurrency: cfg.concurrency.max(1),
            buffer_bytes: cfg.buffer_bytes.max(1),
            follow_links: cfg.follow_links,
        }
    }
}

/// Entry point of the scan. Holds no per-run state, so one scanner can run
/// any number of scans, including concurrently.
pub struct Scanner {
    options: ScanOptions,
    observer: Arc<dyn ScanObserver>,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }
}

/// Scan `root` with default options.
pub async fn checksum_tree(root: &Path) -> Result<Vec<ChecksumEntry>, ScanError> {
    Scanner::new(ScanOptions::default()).run(root).await
}
