//! Top-level registry of watched roots.
//!
//! Each registered root gets an independent watcher/coordinator pair
//! sharing a pending queue, an index lock, and a cancellation token.
//! Pairs share no state with each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use filedex_core::{IndexConfig, IndexNode, WatchError};

use crate::coordinator::Coordinator;
use crate::pending::PendingQueue;
use crate::watcher::ChangeWatcher;

/// One root's watcher/coordinator pair and shared state.
struct RootPair {
    cancel: CancellationToken,
    index: Arc<Mutex<IndexNode>>,
    degraded: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
    coordinator: Option<JoinHandle<()>>,
}

impl RootPair {
    /// Cancel the pair and join both threads. Bounded by the watcher
    /// poll interval plus one in-flight crawl or splice.
    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.watcher.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.coordinator.take() {
            let _ = handle.join();
        }
    }
}

/// Registry owning all watched roots.
///
/// External consumers only interact with the index through
/// [`Supervisor::snapshot`], which hands out a deep copy; the live
/// tree is never exposed.
#[derive(Default)]
pub struct Supervisor {
    roots: Mutex<HashMap<PathBuf, RootPair>>,
}

impl Supervisor {
    /// Create an empty supervisor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching and indexing a root.
    ///
    /// The root is canonicalized; the canonical path is the handle
    /// used by `stop` and `snapshot` and is returned on success.
    /// Watch setup failure is fatal to the pair and reported here.
    pub fn start(&self, config: IndexConfig) -> Result<PathBuf, WatchError> {
        let root = config
            .root
            .canonicalize()
            .map_err(|err| WatchError::io(&config.root, err))?;
        if !root.is_dir() {
            return Err(WatchError::NotADirectory { path: root });
        }

        let mut roots = self.lock_roots();
        if roots.contains_key(&root) {
            return Err(WatchError::AlreadyWatched { path: root });
        }

        let config = IndexConfig {
            root: root.clone(),
            ..config
        };

        let index = Arc::new(Mutex::new(IndexNode::empty_dir()));
        let queue = Arc::new(PendingQueue::new());
        let cancel = CancellationToken::new();
        let degraded = Arc::new(AtomicBool::new(false));

        // Construct the watcher before spawning anything so setup
        // errors surface from start() with nothing to unwind.
        let watcher = ChangeWatcher::new(
            root.clone(),
            queue.clone(),
            cancel.clone(),
            degraded.clone(),
            config.watch_poll_interval,
        )?;
        let coordinator = Coordinator::new(
            config,
            index.clone(),
            queue,
            cancel.clone(),
            degraded.clone(),
        );

        let watcher_handle = std::thread::Builder::new()
            .name(format!("filedex-watch:{}", root.display()))
            .spawn(move || watcher.run())
            .map_err(|err| WatchError::io(&root, err))?;

        let coordinator_handle = match std::thread::Builder::new()
            .name(format!("filedex-index:{}", root.display()))
            .spawn(move || coordinator.run())
        {
            Ok(handle) => handle,
            Err(err) => {
                cancel.cancel();
                let _ = watcher_handle.join();
                return Err(WatchError::io(&root, err));
            }
        };

        info!(root = %root.display(), "root registered");
        roots.insert(
            root.clone(),
            RootPair {
                cancel,
                index,
                degraded,
                watcher: Some(watcher_handle),
                coordinator: Some(coordinator_handle),
            },
        );

        Ok(root)
    }

    /// Stop a root's pair and drop its index.
    ///
    /// Returns false when the root was not being watched.
    pub fn stop(&self, root: &Path) -> bool {
        let pair = self.lock_roots().remove(root);
        match pair {
            Some(mut pair) => {
                pair.shutdown();
                info!(root = %root.display(), "root stopped");
                true
            }
            None => {
                warn!(root = %root.display(), "stop requested for unwatched root");
                false
            }
        }
    }

    /// Deep copy of a root's current index.
    ///
    /// The copy is the caller's to keep; mutating it never affects
    /// the live index. The registry lock is released before the index
    /// lock is taken: a full recrawl in progress delays this snapshot,
    /// never operations on other roots.
    pub fn snapshot(&self, root: &Path) -> Option<IndexNode> {
        let index = self.lock_roots().get(root)?.index.clone();
        let index = index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Some(index)
    }

    /// Whether a root's watcher has failed and the index is kept
    /// fresh by full recrawls only.
    pub fn is_degraded(&self, root: &Path) -> Option<bool> {
        let roots = self.lock_roots();
        Some(roots.get(root)?.degraded.load(Ordering::Relaxed))
    }

    /// Currently watched roots.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.lock_roots().keys().cloned().collect()
    }

    fn lock_roots(&self) -> MutexGuard<'_, HashMap<PathBuf, RootPair>> {
        self.roots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn index_handle(&self, root: &Path) -> Option<Arc<Mutex<IndexNode>>> {
        Some(self.lock_roots().get(root)?.index.clone())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        let mut roots = self.lock_roots();
        for (_, pair) in roots.iter_mut() {
            pair.shutdown();
        }
        roots.clear();
    }
}
