//! Core types for filedex.
//!
//! This crate provides the data structures shared across the filedex
//! ecosystem: the content-addressed index tree, configuration, the
//! warning/error taxonomy, and the pure subtree-splice algorithm.
//! There is no filesystem I/O here.

mod config;
mod error;
mod node;
mod splice;

pub use config::{IndexConfig, IndexConfigBuilder};
pub use error::{CrawlWarning, WarningKind, WatchError};
pub use node::{ContentHash, DirNode, FileEntry, IndexNode};
pub use splice::{relative_segments, splice};
