//! Recursive tree crawler.
//!
//! `crawl` is purely a function of filesystem state at call time: it
//! keeps no shared mutable state and is safe to invoke concurrently
//! for disjoint subtrees. Per-entry failures never abort a crawl;
//! they are logged, recorded as warnings, and the affected entry is
//! omitted or marked unresolved.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use compact_str::CompactString;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use filedex_core::{CrawlWarning, DirNode, FileEntry, IndexConfig, IndexNode};

use crate::hasher::{hash_file, HashOutcome};
use crate::progress::CrawlProgress;

/// Emit a progress update every this many files.
const PROGRESS_EVERY_FILES: u64 = 512;

/// Counters collected during one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Files indexed.
    pub files: u64,
    /// Directories indexed.
    pub dirs: u64,
    /// Total bytes across file entries.
    pub bytes: u64,
    /// Files whose content was hashed.
    pub hashed: u64,
    /// Files skipped by the hash policy (size recorded only).
    pub skipped: u64,
    /// Entries that resolved to neither file nor directory.
    pub unresolved: u64,
}

/// Result of crawling one path.
#[derive(Debug, Clone)]
pub struct Crawled {
    /// The indexed subtree rooted at the crawled path.
    pub node: IndexNode,
    /// Counters for this crawl.
    pub stats: CrawlStats,
    /// Non-fatal problems encountered.
    pub warnings: Vec<CrawlWarning>,
    /// Wall-clock duration of the crawl.
    pub duration: Duration,
}

/// Crawls paths into index subtrees, hashing file leaves.
pub struct Crawler {
    config: IndexConfig,
    progress_tx: broadcast::Sender<CrawlProgress>,
}

impl Crawler {
    /// Create a crawler for one root's configuration.
    pub fn new(config: IndexConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            config,
            progress_tx,
        }
    }

    /// Subscribe to crawl progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlProgress> {
        self.progress_tx.subscribe()
    }

    /// The configuration this crawler runs under.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Crawl `path` into an index subtree.
    ///
    /// Directories become `Directory` nodes of their crawled
    /// children, files become `File` entries via the hasher, and
    /// anything else becomes `Unresolved`.
    pub fn crawl(&self, path: &Path) -> Crawled {
        let start = Instant::now();
        let mut stats = CrawlStats::default();
        let mut warnings = Vec::new();

        let node = self.crawl_node(path, &mut stats, &mut warnings);

        let duration = start.elapsed();
        debug!(
            path = %path.display(),
            files = stats.files,
            dirs = stats.dirs,
            warnings = warnings.len(),
            ?duration,
            "crawl finished"
        );

        Crawled {
            node,
            stats,
            warnings,
            duration,
        }
    }

    fn crawl_node(
        &self,
        path: &Path,
        stats: &mut CrawlStats,
        warnings: &mut Vec<CrawlWarning>,
    ) -> IndexNode {
        // Never follow symlinks; a link stats as neither file nor
        // directory and indexes as Unresolved.
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %path.display(), %err, "stat failed");
                warnings.push(CrawlWarning::metadata_error(path, &err));
                stats.unresolved += 1;
                return IndexNode::Unresolved;
            }
        };

        if metadata.is_dir() {
            self.crawl_dir(path, stats, warnings)
        } else if metadata.is_file() {
            self.crawl_file(path, &metadata, stats, warnings)
        } else {
            warn!(path = %path.display(), "neither file nor directory");
            warnings.push(CrawlWarning::unresolved(path));
            stats.unresolved += 1;
            IndexNode::Unresolved
        }
    }

    fn crawl_dir(
        &self,
        path: &Path,
        stats: &mut CrawlStats,
        warnings: &mut Vec<CrawlWarning>,
    ) -> IndexNode {
        stats.dirs += 1;

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path.display(), %err, "list failed");
                warnings.push(CrawlWarning::list_error(path, &err));
                // Listing failed but the directory exists; partial
                // results for siblings must still be returned.
                return IndexNode::Directory(DirNode::new());
            }
        };

        let mut dir = DirNode::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(path = %path.display(), %err, "entry read failed");
                    warnings.push(CrawlWarning::list_error(path, &err));
                    continue;
                }
            };

            let name = CompactString::new(entry.file_name().to_string_lossy());
            let child = self.crawl_node(&entry.path(), stats, warnings);
            dir.children.insert(name, child);
        }

        IndexNode::Directory(dir)
    }

    fn crawl_file(
        &self,
        path: &Path,
        metadata: &fs::Metadata,
        stats: &mut CrawlStats,
        warnings: &mut Vec<CrawlWarning>,
    ) -> IndexNode {
        let entry = match hash_file(path, metadata, &self.config) {
            Ok((entry, outcome)) => {
                match outcome {
                    HashOutcome::Hashed(_) => stats.hashed += 1,
                    HashOutcome::Skipped(skip) => {
                        stats.skipped += 1;
                        debug!(path = %path.display(), ?skip, "hash skipped");
                    }
                }
                entry
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "hash read failed");
                warnings.push(CrawlWarning::read_error(path, &err));
                stats.skipped += 1;
                FileEntry::size_only(metadata.len())
            }
        };

        stats.files += 1;
        stats.bytes += entry.size;

        if stats.files % PROGRESS_EVERY_FILES == 0 {
            let _ = self.progress_tx.send(CrawlProgress {
                files_crawled: stats.files,
                dirs_crawled: stats.dirs,
                bytes_crawled: stats.bytes,
                current_path: path.to_path_buf(),
                warnings_count: warnings.len() as u64,
            });
        }

        IndexNode::File(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn crawler_for(root: &Path) -> Crawler {
        Crawler::new(IndexConfig::new(root))
    }

    #[test]
    fn test_crawl_builds_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("a")).unwrap();
        fs::write(root.join("a/x.txt"), "hi").unwrap();
        fs::write(root.join("b.txt"), "bye").unwrap();

        let crawled = crawler_for(root).crawl(root);

        let a = crawled.node.child("a").unwrap();
        let x = a.child("x.txt").unwrap().as_file().unwrap();
        assert_eq!(x.size, 2);
        assert_eq!(x.hash.unwrap().0, *blake3::hash(b"hi").as_bytes());

        let b = crawled.node.child("b.txt").unwrap().as_file().unwrap();
        assert_eq!(b.size, 3);
        assert_eq!(b.hash.unwrap().0, *blake3::hash(b"bye").as_bytes());

        assert_eq!(crawled.stats.files, 2);
        assert_eq!(crawled.stats.dirs, 2); // root + a
        assert!(crawled.warnings.is_empty());
    }

    #[test]
    fn test_crawl_single_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("only.txt");
        fs::write(&path, "content").unwrap();

        let crawled = crawler_for(temp.path()).crawl(&path);
        assert!(crawled.node.is_file());
        assert_eq!(crawled.stats.files, 1);
        assert_eq!(crawled.stats.dirs, 0);
    }

    #[test]
    fn test_crawl_missing_path_is_unresolved() {
        let temp = TempDir::new().unwrap();
        let crawled = crawler_for(temp.path()).crawl(&temp.path().join("vanished"));

        assert_eq!(crawled.node, IndexNode::Unresolved);
        assert_eq!(crawled.warnings.len(), 1);
        assert_eq!(crawled.stats.unresolved, 1);
    }

    #[test]
    fn test_crawl_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("d1/d2")).unwrap();
        fs::write(root.join("d1/f1"), "one").unwrap();
        fs::write(root.join("d1/d2/f2"), "two").unwrap();
        fs::write(root.join("f3"), "").unwrap();

        let crawler = crawler_for(root);
        let first = crawler.crawl(root);
        let second = crawler.crawl(root);

        assert_eq!(first.node, second.node);
        assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn test_empty_file_has_hash_of_empty_input() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("zero"), "").unwrap();

        let crawled = crawler_for(temp.path()).crawl(temp.path());
        let entry = crawled.node.child("zero").unwrap().as_file().unwrap();
        assert_eq!(entry.size, 0);
        assert_eq!(entry.hash.unwrap().0, *blake3::hash(b"").as_bytes());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_unresolved() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target"), "data").unwrap();
        std::os::unix::fs::symlink(temp.path().join("target"), temp.path().join("link")).unwrap();

        let crawled = crawler_for(temp.path()).crawl(temp.path());
        assert_eq!(
            crawled.node.child("link"),
            Some(&IndexNode::Unresolved)
        );
        // The symlink target itself still indexes normally.
        assert!(crawled.node.child("target").unwrap().is_file());
    }
}
