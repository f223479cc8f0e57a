//! Walk the tree, fan files out to hashing tasks, and join them all.
//!
//! ```text
//! walker thread ──(bounded channel)──▶ driver ──acquire token──▶ JoinSet
//!   WalkDir, dirs skipped              latch check                spawn_blocking(HashTask)
//! ```
//!
//! The driver returns only after the walker thread and every dispatched task
//! have finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::checksum::ChecksumEntry;
use crate::error::ScanError;

use super::limiter::Limiter;
use super::task::{HashTask, ScanShared};
use super::Scanner;

/// How far the walker may run ahead of dispatch.
const WALK_QUEUE_DEPTH: usize = 64;

type WalkItem = Result<PathBuf, ScanError>;

/// How the dispatch loop ended.
enum WalkEnd {
    /// Every file was dispatched.
    Completed,
    /// A task error was latched; dispatch stopped early.
    Latched,
    /// The traversal itself failed.
    Failed(ScanError),
}

impl Scanner {
    /// Checksum every non-directory entry under `root`.
    ///
    /// Returns all entries sorted by path, or the single error that stopped
    /// the scan. Never returns a partial list. Must be called from within a
    /// tokio runtime.
    pub async fn run(&self, root: &Path) -> Result<Vec<ChecksumEntry>, ScanError> {
        let start = Instant::now();
        let limiter = Limiter::new(self.options.concurrency);
        let shared = Arc::new(ScanShared::new(
            Arc::clone(&self.observer),
            self.options.buffer_bytes,
        ));
        tracing::debug!(
            root = %root.display(),
            concurrency = limiter.capacity(),
            "starting scan"
        );

        let (tx, mut rx) = mpsc::channel::<WalkItem>(WALK_QUEUE_DEPTH);
        let walker = {
            let root = root.to_path_buf();
            let follow_links = self.options.follow_links;
            tokio::task::spawn_blocking(move || walk_tree(&root, follow_links, tx))
        };

        let mut tasks = JoinSet::new();
        let end = dispatch(&mut rx, &limiter, &shared, &mut tasks).await;

        // Closing the receiver stops a walker that is still producing.
        drop(rx);
        let walker_joined = walker.await;

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                shared.latch.try_set(ScanError::from(err));
            }
        }
        debug_assert_eq!(limiter.in_use(), 0, "all admission tokens returned");

        walker_joined?;
        if let WalkEnd::Failed(err) = end {
            tracing::warn!(error = %err, "scan aborted by walk error");
            return Err(err);
        }
        if let Some(err) = shared.latch.take() {
            tracing::warn!(error = %err, "scan failed");
            return Err(err);
        }

        let entries = shared.accumulator.snapshot();
        tracing::info!(
            root = %root.display(),
            files = entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan complete"
        );
        Ok(entries)
    }
}

/// Receive walk items and launch one task per file, stopping at the first
/// walk error or as soon as a task error is visible.
async fn dispatch(
    rx: &mut mpsc::Receiver<WalkItem>,
    limiter: &Limiter,
    shared: &Arc<ScanShared>,
    tasks: &mut JoinSet<()>,
) -> WalkEnd {
    while let Some(item) = rx.recv().await {
        let path = match item {
            Ok(path) => path,
            Err(err) => return WalkEnd::Failed(err),
        };
        if shared.latch.is_set() {
            tracing::debug!(next = %path.display(), "task error latched, stopping dispatch");
            return WalkEnd::Latched;
        }
        let token = limiter.acquire().await;
        tracing::trace!(path = %path.display(), "dispatch");
        let task = HashTask::new(Arc::clone(shared), path, token);
        tasks.spawn_blocking(move || task.run());
    }
    WalkEnd::Completed
}

/// Depth-first walk in file-name order. Directories are descended into but
/// not sent. Stops after sending the first error or when the driver hangs up.
fn walk_tree(root: &Path, follow_links: bool, tx: mpsc::Sender<WalkItem>) {
    let walk = WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name();
    for entry in walk {
        let item = match entry {
            Ok(entry) if entry.file_type().is_dir() => continue,
            Ok(entry) => Ok(entry.into_path()),
            Err(err) => Err(ScanError::walk(err, root)),
        };
        let fatal = item.is_err();
        if tx.blocking_send(item).is_err() || fatal {
            return;
        }
    }
}
