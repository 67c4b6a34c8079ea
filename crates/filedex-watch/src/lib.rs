//! Change watching and live index coordination for filedex.
//!
//! For each registered root, a [`Supervisor`] runs an independent
//! pair of threads sharing a [`PendingQueue`] and an index lock:
//!
//! - a [`ChangeWatcher`] blocks on OS change notifications,
//!   deduplicates each batch by filename, and queues changed paths;
//! - a [`Coordinator`] replaces the whole index on a coarse cadence
//!   and otherwise recrawls queued paths one at a time, splicing each
//!   result into the live tree.
//!
//! A full recrawl strictly supersedes queued incremental work: the
//! queue is cleared atomically with the index replacement. Consumers
//! read through [`Supervisor::snapshot`], which returns a deep copy.
//!
//! # Example
//!
//! ```rust,no_run
//! use filedex_watch::{IndexConfig, Supervisor};
//!
//! let supervisor = Supervisor::new();
//! let root = supervisor.start(IndexConfig::new("/srv/files"))?;
//!
//! // ... later
//! if let Some(index) = supervisor.snapshot(&root) {
//!     println!("{} files indexed", index.file_count());
//! }
//! supervisor.stop(&root);
//! # Ok::<(), filedex_watch::WatchError>(())
//! ```

mod coordinator;
mod pending;
mod supervisor;
mod watcher;

pub use coordinator::Coordinator;
pub use pending::PendingQueue;
pub use supervisor::Supervisor;
pub use watcher::{enqueue_deduplicated, ChangeWatcher};

// Re-export core types for convenience
pub use filedex_core::{IndexConfig, IndexNode, WatchError};
