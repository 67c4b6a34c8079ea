//! Per-root index coordinator.
//!
//! Owns the in-memory index for one root. Each loop iteration, in
//! priority order: honor cancellation; run a full recrawl when one is
//! due (replacing the index wholesale and discarding queued paths);
//! otherwise recrawl one queued path and splice it into the live
//! tree.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use filedex_core::{relative_segments, splice, IndexConfig, IndexNode};
use filedex_crawl::Crawler;

use crate::pending::PendingQueue;

/// Coordinates full and incremental recrawls for one root.
pub struct Coordinator {
    root: PathBuf,
    crawler: Crawler,
    index: Arc<Mutex<IndexNode>>,
    queue: Arc<PendingQueue>,
    cancel: CancellationToken,
    degraded: Arc<AtomicBool>,
    last_full: Option<Instant>,
    degraded_logged: bool,
}

impl Coordinator {
    /// Create a coordinator bound to one root's index and queue.
    pub fn new(
        config: IndexConfig,
        index: Arc<Mutex<IndexNode>>,
        queue: Arc<PendingQueue>,
        cancel: CancellationToken,
        degraded: Arc<AtomicBool>,
    ) -> Self {
        let root = config.root.clone();
        Self {
            root,
            crawler: Crawler::new(config),
            index,
            queue,
            cancel,
            degraded,
            last_full: None,
            degraded_logged: false,
        }
    }

    /// Run the scheduling loop until cancelled.
    pub fn run(mut self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if self.degraded.load(Ordering::Relaxed) && !self.degraded_logged {
                warn!(
                    root = %self.root.display(),
                    "watcher failed; continuing with full recrawls only"
                );
                self.degraded_logged = true;
            }

            if self.full_recrawl_due() {
                self.full_recrawl();
            } else if !self.drain_one() {
                thread::sleep(self.crawler.config().idle_backoff);
            }
        }

        debug!(root = %self.root.display(), "coordinator stopped");
    }

    /// Whether a full recrawl is due: never completed, or the
    /// configured interval has elapsed since the last one.
    pub fn full_recrawl_due(&self) -> bool {
        match self.last_full {
            None => true,
            Some(at) => at.elapsed() >= self.crawler.config().full_recrawl_interval,
        }
    }

    /// Replace the entire index with a fresh crawl of the root.
    ///
    /// The index lock is held for the whole crawl, and the queue is
    /// cleared before it is released: paths queued before or during
    /// the crawl are superseded by the fresh snapshot.
    pub fn full_recrawl(&mut self) {
        let mut guard = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let crawled = self.crawler.crawl(&self.root);

        info!(
            root = %self.root.display(),
            files = crawled.stats.files,
            dirs = crawled.stats.dirs,
            warnings = crawled.warnings.len(),
            duration = ?crawled.duration,
            "full recrawl complete"
        );

        *guard = crawled.node;
        self.queue.clear();
        self.last_full = Some(Instant::now());
    }

    /// Recrawl one queued path and splice it into the index.
    ///
    /// Returns false when the queue was empty. The crawl itself runs
    /// without the lock; only the splice takes it, so incremental
    /// updates stay short.
    pub fn drain_one(&mut self) -> bool {
        let Some(path) = self.queue.pop() else {
            return false;
        };

        let Some(segments) = relative_segments(&self.root, &path) else {
            warn!(
                root = %self.root.display(),
                path = %path.display(),
                "queued path outside root, skipping"
            );
            return true;
        };

        let crawled = self.crawler.crawl(&path);
        debug!(
            path = %path.display(),
            files = crawled.stats.files,
            warnings = crawled.warnings.len(),
            "incremental recrawl"
        );

        let mut guard = self.lock_index();
        splice(&mut guard, &segments, crawled.node);
        true
    }

    /// The instant the last full recrawl completed, if any.
    pub fn last_full_recrawl(&self) -> Option<Instant> {
        self.last_full
    }

    fn lock_index(&self) -> MutexGuard<'_, IndexNode> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn coordinator_for(root: &std::path::Path) -> (Coordinator, Arc<Mutex<IndexNode>>, Arc<PendingQueue>) {
        let index = Arc::new(Mutex::new(IndexNode::empty_dir()));
        let queue = Arc::new(PendingQueue::new());
        let coordinator = Coordinator::new(
            IndexConfig::new(root),
            index.clone(),
            queue.clone(),
            CancellationToken::new(),
            Arc::new(AtomicBool::new(false)),
        );
        (coordinator, index, queue)
    }

    #[test]
    fn test_first_full_recrawl_is_due() {
        let temp = TempDir::new().unwrap();
        let (mut coordinator, index, _queue) = coordinator_for(temp.path());

        assert!(coordinator.full_recrawl_due());
        fs::write(temp.path().join("f.txt"), "x").unwrap();
        coordinator.full_recrawl();

        assert!(!coordinator.full_recrawl_due());
        assert_eq!(index.lock().unwrap().file_count(), 1);
    }

    #[test]
    fn test_full_recrawl_clears_queue() {
        let temp = TempDir::new().unwrap();
        let (mut coordinator, _index, queue) = coordinator_for(temp.path());

        queue.push(temp.path().join("p1"));
        queue.push(temp.path().join("p2"));
        coordinator.full_recrawl();

        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_one_on_empty_queue() {
        let temp = TempDir::new().unwrap();
        let (mut coordinator, _index, _queue) = coordinator_for(temp.path());
        assert!(!coordinator.drain_one());
    }

    #[test]
    fn test_drain_one_skips_path_outside_root() {
        let temp = TempDir::new().unwrap();
        let (mut coordinator, index, queue) = coordinator_for(temp.path());
        coordinator.full_recrawl();

        queue.push(PathBuf::from("/definitely/elsewhere"));
        assert!(coordinator.drain_one());
        assert_eq!(index.lock().unwrap().file_count(), 0);
    }
}
