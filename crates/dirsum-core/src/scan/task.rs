//! The unit of work: hash one file and record either its entry or its error.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use crate::checksum::{hash_file, ChecksumEntry};
use crate::error::{panic_message, ScanError};

use super::accumulator::Accumulator;
use super::latch::ErrorLatch;
use super::limiter::AdmissionToken;
use super::observer::ScanObserver;

/// State shared by the driver and every task of one scan.
pub(super) struct ScanShared {
    pub(super) accumulator: Accumulator,
    pub(super) latch: ErrorLatch,
    pub(super) observer: Arc<dyn ScanObserver>,
    pub(super) buffer_bytes: usize,
}

impl ScanShared {
    pub(super) fn new(observer: Arc<dyn ScanObserver>, buffer_bytes: usize) -> Self {
        Self {
            accumulator: Accumulator::new(),
            latch: ErrorLatch::new(),
            observer,
            buffer_bytes,
        }
    }
}

/// One dispatched task. Built by the driver after it acquires the token and
/// moved into the task, so cleanup runs when the task ends however it ends.
pub(super) struct HashTask {
    shared: Arc<ScanShared>,
    path: PathBuf,
    // Dropped after `Drop::drop` runs, so the finish notification happens
    // while the slot is still held.
    _token: AdmissionToken,
}

impl HashTask {
    pub(super) fn new(shared: Arc<ScanShared>, path: PathBuf, token: AdmissionToken) -> Self {
        Self {
            shared,
            path,
            _token: token,
        }
    }

    /// Hash the file. Produces exactly one accumulator entry or one latch
    /// attempt. A panic while hashing is reported as a task failure.
    pub(super) fn run(self) {
        let shared = &self.shared;
        let path = &self.path;
        shared.observer.task_started(path);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            hash_file(path, shared.buffer_bytes)
        }))
        .unwrap_or_else(|payload| {
            Err(ScanError::TaskPanicked {
                path: path.clone(),
                message: panic_message(&*payload),
            })
        });

        match outcome {
            Ok((digest, bytes)) => {
                shared.observer.file_hashed(path, bytes);
                shared
                    .accumulator
                    .add(ChecksumEntry::new(path.clone(), digest));
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "hashing failed");
                shared.observer.task_failed(path, &err);
                if !shared.latch.try_set(err) {
                    tracing::trace!(path = %path.display(), "error already latched, dropping");
                }
            }
        }
    }
}

impl Drop for HashTask {
    fn drop(&mut self) {
        self.shared.observer.task_finished(&self.path);
    }
}
