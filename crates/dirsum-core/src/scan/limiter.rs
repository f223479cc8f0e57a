//! Admission gate bounding how many hashing tasks run at once.
//!
//! Each task holds one [`AdmissionToken`] for its whole lifetime. The token
//! returns its slot when dropped, so release happens exactly once on every
//! exit path, including unwinding.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting gate with a fixed capacity of at least one slot.
#[derive(Debug)]
pub struct Limiter {
    capacity: usize,
    slots: Arc<Semaphore>,
}

/// Proof of one admitted task. Dropping it frees the slot and wakes a waiter.
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

impl Limiter {
    /// Create a gate with `capacity` slots (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            slots: Arc::new(Semaphore::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held by tokens.
    pub fn in_use(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }

    /// Wait until a slot is free and take it.
    pub async fn acquire(&self) -> AdmissionToken {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");
        AdmissionToken { _permit: permit }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<AdmissionToken> {
        Arc::clone(&self.slots)
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionToken { _permit: permit })
    }
}
