//! Queue of paths awaiting incremental recrawl.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Unbounded, ordered, thread-safe queue of absolute paths.
///
/// Shared by exactly one watcher (producer) and one coordinator
/// (consumer). `clear` removes everything in one step so a full
/// recrawl can atomically supersede queued incremental work.
#[derive(Debug, Default)]
pub struct PendingQueue {
    inner: Mutex<VecDeque<PathBuf>>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path to the back of the queue.
    pub fn push(&self, path: PathBuf) {
        self.lock().push_back(path);
    }

    /// Pop the oldest path, without blocking.
    pub fn pop(&self) -> Option<PathBuf> {
        self.lock().pop_front()
    }

    /// Discard all queued paths.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of queued paths.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<PathBuf>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
