//! Hooks into the life of each hashing task, and a counter-based observer
//! used for progress reporting.

use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::error::ScanError;

/// Callbacks invoked from hashing tasks (on blocking-pool threads).
///
/// `task_started` runs after the task holds its admission token and
/// `task_finished` runs exactly once per task before the token is released,
/// so the number of tasks between the two calls never exceeds the
/// concurrency limit.
pub trait ScanObserver: Send + Sync {
    fn task_started(&self, _path: &Path) {}

    fn file_hashed(&self, _path: &Path, _bytes: u64) {}

    fn task_failed(&self, _path: &Path, _err: &ScanError) {}

    fn task_finished(&self, _path: &Path) {}
}

/// Observer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Snapshot of scan progress (CLI-friendly).
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    pub started: u64,
    pub hashed: u64,
    pub failed: u64,
    pub finished: u64,
    pub bytes: u64,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

impl ScanProgress {
    pub fn files_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.hashed as f64 / secs
        } else {
            0.0
        }
    }

    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs
        } else {
            0.0
        }
    }
}

/// Atomic counters fed by task callbacks.
#[derive(Debug)]
pub struct ScanStats {
    started: AtomicU64,
    hashed: AtomicU64,
    failed: AtomicU64,
    finished: AtomicU64,
    bytes: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    created: Instant,
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanStats {
    pub fn new() -> Self {
        Self {
            started: AtomicU64::new(0),
            hashed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            finished: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            created: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            started: self.started.load(Ordering::Relaxed),
            hashed: self.hashed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            finished: self.finished.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Acquire),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
            elapsed: self.created.elapsed(),
        }
    }
}

impl ScanObserver for ScanStats {
    fn task_started(&self, _path: &Path) {
        self.started.fetch_add(1, Ordering::Relaxed);
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
    }

    fn file_hashed(&self, _path: &Path, bytes: u64) {
        self.hashed.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn task_failed(&self, _path: &Path, _err: &ScanError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    fn task_finished(&self, _path: &Path) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.finished.fetch_add(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_peak_in_flight() {
        let stats = ScanStats::new();
        let p = Path::new("/x");
        stats.task_started(p);
        stats.task_started(p);
        stats.file_hashed(p, 10);
        stats.task_finished(p);
        stats.task_started(p);
        stats.task_finished(p);
        stats.task_finished(p);

        let snap = stats.snapshot();
        assert_eq!(snap.started, 3);
        assert_eq!(snap.finished, 3);
        assert_eq!(snap.hashed, 1);
        assert_eq!(snap.bytes, 10);
        assert_eq!(snap.in_flight, 0);
        assert_eq!(snap.peak_in_flight, 2);
    }

    #[test]
    fn rates_are_zero_without_elapsed_time() {
        let progress = ScanProgress::default();
        assert_eq!(progress.files_per_sec(), 0.0);
        assert_eq!(progress.bytes_per_sec(), 0.0);
    }
}
