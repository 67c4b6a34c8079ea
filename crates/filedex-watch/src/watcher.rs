//! Per-root change watcher.
//!
//! Wraps the OS change-notification facility (via the notify crate,
//! recursive mode) for one root. Runs on its own thread: blocks
//! waiting for change batches, deduplicates each batch by base
//! filename, and pushes one absolute path per distinct changed file
//! onto the shared [`PendingQueue`]. The action kind (create, delete,
//! rename) is discarded; every change means "this path needs
//! recrawling".

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use filedex_core::WatchError;

use crate::pending::PendingQueue;

/// Watches one root for filesystem changes.
///
/// The underlying OS wait has no timeout of its own; the loop polls
/// the event channel with a bounded timeout so cancellation, checked
/// only between waits, is observed within one poll interval.
pub struct ChangeWatcher {
    root: PathBuf,
    queue: Arc<PendingQueue>,
    cancel: CancellationToken,
    degraded: Arc<AtomicBool>,
    poll_interval: Duration,
    receiver: Receiver<Result<Event, notify::Error>>,
    // Dropping the watcher deregisters the OS watch; keep it alive
    // for the lifetime of the loop.
    _watcher: RecommendedWatcher,
}

impl ChangeWatcher {
    /// Set up a recursive watch on `root`.
    ///
    /// Setup failure is fatal to the root's watcher/coordinator pair
    /// and is surfaced to the caller of `Supervisor::start`.
    pub fn new(
        root: PathBuf,
        queue: Arc<PendingQueue>,
        cancel: CancellationToken,
        degraded: Arc<AtomicBool>,
        poll_interval: Duration,
    ) -> Result<Self, WatchError> {
        let (tx, receiver) = channel();

        let mut watcher = notify::recommended_watcher(tx)
            .map_err(|err| WatchError::setup(&root, err.to_string()))?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|err| WatchError::setup(&root, err.to_string()))?;

        info!(root = %root.display(), "watching for changes");

        Ok(Self {
            root,
            queue,
            cancel,
            degraded,
            poll_interval,
            receiver,
            _watcher: watcher,
        })
    }

    /// Run the watch loop until cancelled or the watch fails.
    pub fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let first = match self.receiver.recv_timeout(self.poll_interval) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    self.fail("event channel closed");
                    return;
                }
            };

            if !self.drain_batch(first) {
                return;
            }
        }

        debug!(root = %self.root.display(), "watcher stopped");
    }

    /// Drain one batch: the first received event plus everything
    /// already buffered. Returns false on a fatal watch error.
    fn drain_batch(&self, first: Result<Event, notify::Error>) -> bool {
        let mut paths = Vec::new();

        for result in std::iter::once(first).chain(self.receiver.try_iter()) {
            match result {
                Ok(event) => paths.extend(event.paths),
                Err(err) => {
                    self.fail(&err.to_string());
                    return false;
                }
            }
        }

        let enqueued = enqueue_deduplicated(&self.queue, paths);
        if enqueued > 0 {
            debug!(
                root = %self.root.display(),
                enqueued,
                pending = self.queue.len(),
                "change batch drained"
            );
        }
        true
    }

    fn fail(&self, message: &str) {
        error!(
            root = %self.root.display(),
            message,
            "watch loop failed; index degrades to full recrawls only"
        );
        self.degraded.store(true, Ordering::Relaxed);
    }
}

/// Push each batch path onto the queue, once per distinct base
/// filename (first occurrence wins). Returns how many were enqueued.
pub fn enqueue_deduplicated(
    queue: &PendingQueue,
    batch: impl IntoIterator<Item = PathBuf>,
) -> usize {
    let mut seen: HashSet<OsString> = HashSet::new();
    let mut enqueued = 0;

    for path in batch {
        let Some(name) = path.file_name() else {
            continue;
        };
        if seen.insert(name.to_os_string()) {
            queue.push(path);
            enqueued += 1;
        }
    }

    enqueued
}
