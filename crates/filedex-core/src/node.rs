//! Index node types.

use std::collections::HashMap;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// BLAKE3 content hash of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// A single indexed file: size plus content hash.
///
/// `hash` is `None` when hashing was skipped (placeholder file,
/// oversized file) or failed mid-read; the size alone still supports
/// quick inequality checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Size in bytes.
    pub size: u64,
    /// Content hash, if one was computed.
    pub hash: Option<ContentHash>,
}

impl FileEntry {
    /// Create a file entry with a known hash.
    pub fn hashed(size: u64, hash: ContentHash) -> Self {
        Self {
            size,
            hash: Some(hash),
        }
    }

    /// Create a file entry whose hash was skipped or lost.
    pub fn size_only(size: u64) -> Self {
        Self { size, hash: None }
    }
}

/// An indexed directory: its children keyed by name.
///
/// Child names are single path segments and never contain separators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirNode {
    /// Children by name, order-irrelevant.
    pub children: HashMap<CompactString, IndexNode>,
}

impl DirNode {
    /// Create an empty directory node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&IndexNode> {
        self.children.get(name)
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// A node in the content index.
///
/// The index is a point-in-time snapshot of filesystem state at crawl
/// time, rooted at an absolute path owned by exactly one coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexNode {
    /// Regular file with size and optional content hash.
    File(FileEntry),
    /// Directory with named children.
    Directory(DirNode),
    /// The path's type could not be determined (vanished between
    /// discovery and stat, device node, symlink). Consumers must not
    /// treat this as either a file or a directory.
    Unresolved,
}

impl IndexNode {
    /// Create an empty directory node.
    pub fn empty_dir() -> Self {
        Self::Directory(DirNode::new())
    }

    /// Check if this is a file entry.
    pub fn is_file(&self) -> bool {
        matches!(self, IndexNode::File(_))
    }

    /// Check if this is a directory entry.
    pub fn is_dir(&self) -> bool {
        matches!(self, IndexNode::Directory(_))
    }

    /// Get the directory contents, if this is a directory.
    pub fn as_dir(&self) -> Option<&DirNode> {
        match self {
            IndexNode::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    /// Get the file entry, if this is a file.
    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            IndexNode::File(entry) => Some(entry),
            _ => None,
        }
    }

    /// Follow a single child-name segment.
    pub fn child(&self, name: &str) -> Option<&IndexNode> {
        self.as_dir().and_then(|dir| dir.child(name))
    }

    /// Total number of file entries in this subtree.
    pub fn file_count(&self) -> u64 {
        match self {
            IndexNode::File(_) => 1,
            IndexNode::Directory(dir) => dir.children.values().map(IndexNode::file_count).sum(),
            IndexNode::Unresolved => 0,
        }
    }

    /// Total bytes across all file entries in this subtree.
    pub fn total_size(&self) -> u64 {
        match self {
            IndexNode::File(entry) => entry.size,
            IndexNode::Directory(dir) => dir.children.values().map(IndexNode::total_size).sum(),
            IndexNode::Unresolved => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_hex() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_hex().starts_with("abab"));
    }

    #[test]
    fn test_file_entry_variants() {
        let hashed = FileEntry::hashed(12, ContentHash::new([0; 32]));
        assert!(hashed.hash.is_some());

        let skipped = FileEntry::size_only(1 << 31);
        assert_eq!(skipped.size, 1 << 31);
        assert!(skipped.hash.is_none());
    }

    #[test]
    fn test_node_discrimination() {
        let file = IndexNode::File(FileEntry::size_only(1));
        assert!(file.is_file());
        assert!(!file.is_dir());

        let dir = IndexNode::empty_dir();
        assert!(dir.is_dir());
        assert!(!dir.is_file());

        let unresolved = IndexNode::Unresolved;
        assert!(!unresolved.is_file());
        assert!(!unresolved.is_dir());
    }

    #[test]
    fn test_subtree_counts() {
        let mut root = DirNode::new();
        let mut sub = DirNode::new();
        sub.children.insert(
            "a.txt".into(),
            IndexNode::File(FileEntry::size_only(2)),
        );
        root.children.insert("sub".into(), IndexNode::Directory(sub));
        root.children.insert(
            "b.txt".into(),
            IndexNode::File(FileEntry::size_only(3)),
        );
        root.children.insert("gone".into(), IndexNode::Unresolved);

        let root = IndexNode::Directory(root);
        assert_eq!(root.file_count(), 2);
        assert_eq!(root.total_size(), 5);
        assert!(root.child("sub").unwrap().child("a.txt").is_some());
    }
}
