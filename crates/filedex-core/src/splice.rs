//! Subtree splice: merge a freshly crawled subtree into a live index.
//!
//! The splice is a pure tree operation so it can be tested without a
//! filesystem; the coordinator is responsible for running it under the
//! same exclusive lock as a full index replacement.

use std::path::{Component, Path};

use compact_str::CompactString;

use crate::node::IndexNode;

/// Decompose `path` into child-name segments relative to `root`.
///
/// Returns an empty vector when `path` is the root itself, and `None`
/// when `path` does not lie under `root`.
pub fn relative_segments(root: &Path, path: &Path) -> Option<Vec<CompactString>> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                segments.push(CompactString::new(name.to_string_lossy()))
            }
            // strip_prefix output is purely relative; anything else
            // (.., prefixes) means the caller handed us a path we
            // cannot resolve inside the tree.
            _ => return None,
        }
    }
    Some(segments)
}

/// Replace the entry at `segments` inside `index` with `subtree`.
///
/// Intermediate segments are required to be directories: a missing
/// child is created as an empty directory (the path may be newly
/// created on disk), and a non-directory occupant is overwritten by
/// one. An empty segment path replaces the entire index.
pub fn splice(index: &mut IndexNode, segments: &[CompactString], subtree: IndexNode) {
    let Some((last, intermediate)) = segments.split_last() else {
        *index = subtree;
        return;
    };

    let mut node = index;
    for segment in intermediate {
        node = force_dir(node)
            .children
            .entry(segment.clone())
            .or_insert_with(IndexNode::empty_dir);
    }
    force_dir(node).children.insert(last.clone(), subtree);
}

/// Get a node's directory contents, turning it into an empty
/// directory first if it is anything else.
fn force_dir(node: &mut IndexNode) -> &mut crate::node::DirNode {
    if !node.is_dir() {
        *node = IndexNode::empty_dir();
    }
    match node {
        IndexNode::Directory(dir) => dir,
        _ => unreachable!("node was just replaced with a directory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DirNode, FileEntry};
    use std::path::PathBuf;

    fn file(size: u64) -> IndexNode {
        IndexNode::File(FileEntry::size_only(size))
    }

    #[test]
    fn test_relative_segments() {
        let root = PathBuf::from("/data");
        let segments = relative_segments(&root, Path::new("/data/a/b.txt")).unwrap();
        assert_eq!(segments, vec!["a", "b.txt"]);

        assert!(relative_segments(&root, Path::new("/data")).unwrap().is_empty());
        assert!(relative_segments(&root, Path::new("/other/a")).is_none());
    }

    #[test]
    fn test_splice_replaces_existing_entry() {
        let mut root = DirNode::new();
        root.children.insert("a.txt".into(), file(1));
        root.children.insert("b.txt".into(), file(2));
        let mut index = IndexNode::Directory(root);

        splice(&mut index, &["a.txt".into()], file(9));

        assert_eq!(index.child("a.txt"), Some(&file(9)));
        assert_eq!(index.child("b.txt"), Some(&file(2)));
    }

    #[test]
    fn test_splice_creates_missing_intermediates() {
        let mut index = IndexNode::empty_dir();

        splice(
            &mut index,
            &["a".into(), "b".into(), "c.txt".into()],
            file(5),
        );

        let node = index
            .child("a")
            .and_then(|n| n.child("b"))
            .and_then(|n| n.child("c.txt"));
        assert_eq!(node, Some(&file(5)));
    }

    #[test]
    fn test_splice_overwrites_non_directory_intermediate() {
        // A file was replaced on disk by a directory of the same name.
        let mut root = DirNode::new();
        root.children.insert("a".into(), file(1));
        let mut index = IndexNode::Directory(root);

        splice(&mut index, &["a".into(), "x.txt".into()], file(7));

        assert!(index.child("a").unwrap().is_dir());
        assert_eq!(index.child("a").unwrap().child("x.txt"), Some(&file(7)));
    }

    #[test]
    fn test_splice_empty_segments_replaces_whole_index() {
        let mut index = IndexNode::empty_dir();
        let mut replacement = DirNode::new();
        replacement.children.insert("new.txt".into(), file(3));

        splice(&mut index, &[], IndexNode::Directory(replacement));

        assert_eq!(index.file_count(), 1);
        assert!(index.child("new.txt").is_some());
    }

    #[test]
    fn test_splice_unresolved_subtree() {
        let mut root = DirNode::new();
        root.children.insert("gone.txt".into(), file(4));
        let mut index = IndexNode::Directory(root);

        // A deleted path recrawls as Unresolved; it replaces the
        // stale entry rather than removing it.
        splice(&mut index, &["gone.txt".into()], IndexNode::Unresolved);

        assert_eq!(index.child("gone.txt"), Some(&IndexNode::Unresolved));
        assert_eq!(index.file_count(), 0);
    }
}
