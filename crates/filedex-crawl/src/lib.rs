//! Content hashing and tree crawling engine for filedex.
//!
//! This crate turns filesystem paths into index subtrees: directories
//! become nodes of named children, files become size + BLAKE3 hash
//! entries, and unreadable or vanished paths are recorded as warnings
//! without aborting the crawl.
//!
//! # Example
//!
//! ```rust,no_run
//! use filedex_crawl::{Crawler, IndexConfig};
//! use std::path::Path;
//!
//! let crawler = Crawler::new(IndexConfig::new("/path/to/index"));
//! let crawled = crawler.crawl(Path::new("/path/to/index"));
//!
//! println!("indexed {} files", crawled.stats.files);
//! println!("{} warnings", crawled.warnings.len());
//! ```
//!
//! # Progress monitoring
//!
//! Subscribe to periodic progress updates while a crawl runs on
//! another thread:
//!
//! ```rust,no_run
//! use filedex_crawl::{Crawler, IndexConfig};
//!
//! let crawler = Crawler::new(IndexConfig::new("/path/to/index"));
//! let mut progress_rx = crawler.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("crawled {} files", progress.files_crawled);
//!     }
//! });
//! ```

mod crawler;
mod hasher;
mod progress;

pub use crawler::{Crawled, CrawlStats, Crawler};
pub use hasher::{hash_file, stream_hash, HashOutcome, HashSkip, HASH_BLOCK_SIZE};
pub use progress::CrawlProgress;

// Re-export core types for convenience
pub use filedex_core::{
    ContentHash, CrawlWarning, DirNode, FileEntry, IndexConfig, IndexNode, WarningKind,
};
