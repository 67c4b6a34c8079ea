//! Crawl progress reporting.

use std::path::PathBuf;

/// Progress information emitted periodically during a crawl.
#[derive(Debug, Clone)]
pub struct CrawlProgress {
    /// Number of files crawled so far.
    pub files_crawled: u64,
    /// Number of directories crawled so far.
    pub dirs_crawled: u64,
    /// Total bytes accounted for so far.
    pub bytes_crawled: u64,
    /// Path currently being crawled.
    pub current_path: PathBuf,
    /// Number of warnings so far.
    pub warnings_count: u64,
}

impl CrawlProgress {
    /// Total items crawled (files + directories).
    pub fn total_items(&self) -> u64 {
        self.files_crawled + self.dirs_crawled
    }
}
