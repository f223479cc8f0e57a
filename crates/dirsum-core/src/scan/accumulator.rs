//! Append-only collection of checksum results shared by hashing tasks.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::checksum::ChecksumEntry;

/// Results gathered during one scan. `add` may be called from any number of
/// tasks; `snapshot` is only called once every task has been joined.
#[derive(Debug, Default)]
pub struct Accumulator {
    entries: Mutex<Vec<ChecksumEntry>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChecksumEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, entry: ChecksumEntry) {
        self.lock().push(entry);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every entry out, sorted by the raw bytes of the path.
    ///
    /// Byte order differs from `Path`'s component order: `a-b/x` sorts before
    /// `a/x` because `-` (0x2d) is less than `/` (0x2f).
    pub fn snapshot(&self) -> Vec<ChecksumEntry> {
        let mut entries = std::mem::take(&mut *self.lock());
        entries.sort_unstable_by(|a, b| {
            a.path()
                .as_os_str()
                .as_encoded_bytes()
                .cmp(b.path().as_os_str().as_encoded_bytes())
        });
        entries
    }
}
