//! Single-slot, first-write-wins holder for task errors.
//!
//! Which error wins under simultaneous failures is whichever task takes the
//! lock first; callers must not rely on it being the chronologically first.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ScanError;

#[derive(Debug, Default)]
pub struct ErrorLatch {
    slot: Mutex<Option<ScanError>>,
}

impl ErrorLatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ScanError>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `err` if the slot is empty. Returns false (and drops `err`) if
    /// an error was already latched.
    pub fn try_set(&self, err: ScanError) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(err);
        true
    }

    /// Whether an error has been latched. Never blocks on producers doing I/O.
    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    /// Run `f` against the latched error without taking it.
    pub fn peek<R>(&self, f: impl FnOnce(Option<&ScanError>) -> R) -> R {
        f(self.lock().as_ref())
    }

    /// Remove and return the latched error.
    pub fn take(&self) -> Option<ScanError> {
        self.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn open_err(path: &str) -> ScanError {
        ScanError::Open {
            path: PathBuf::from(path),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
    }

    #[test]
    fn first_error_wins() {
        let latch = ErrorLatch::new();
        assert!(!latch.is_set());
        assert!(latch.try_set(open_err("/a")));
        assert!(!latch.try_set(open_err("/b")));
        assert!(latch.is_set());
        let path = latch.peek(|e| e.and_then(|e| e.path()).map(Path::to_path_buf));
        assert_eq!(path, Some(PathBuf::from("/a")));
        let err = latch.take().unwrap();
        assert_eq!(err.path(), Some(Path::new("/a")));
        assert!(latch.take().is_none());
    }

    #[test]
    fn exactly_one_concurrent_setter_wins() {
        let latch = Arc::new(ErrorLatch::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || latch.try_set(open_err(&format!("/f{i}"))))
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert!(latch.is_set());
    }
}
