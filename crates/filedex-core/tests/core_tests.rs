use std::path::Path;
use std::time::Duration;

use filedex_core::{
    relative_segments, splice, ContentHash, DirNode, FileEntry, IndexConfig, IndexNode,
};

#[test]
fn test_content_hash_roundtrip() {
    let hash = ContentHash::new([0x5a; 32]);
    let hex = hash.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));

    assert_eq!(hash, ContentHash::new([0x5a; 32]));
    assert_ne!(hash, ContentHash::new([0x5b; 32]));
}

#[test]
fn test_index_node_serde() {
    let mut root = DirNode::new();
    root.children.insert(
        "a.txt".into(),
        IndexNode::File(FileEntry::hashed(2, ContentHash::new([1; 32]))),
    );
    root.children.insert("lost".into(), IndexNode::Unresolved);
    let index = IndexNode::Directory(root);

    let json = serde_json::to_string(&index).unwrap();
    let back: IndexNode = serde_json::from_str(&json).unwrap();
    assert_eq!(index, back);
}

#[test]
fn test_config_builder_overrides() {
    let config = IndexConfig::builder()
        .root("/srv/files")
        .skip_placeholders(false)
        .idle_backoff(Duration::from_millis(5))
        .build()
        .unwrap();

    assert_eq!(config.root, Path::new("/srv/files"));
    assert!(!config.skip_placeholders);
    assert_eq!(config.idle_backoff, Duration::from_millis(5));
}

#[test]
fn test_splice_matches_manual_tree_edit() {
    // Build /data with a/x.txt and b.txt, then splice a replacement
    // for the whole "a" directory.
    let mut a = DirNode::new();
    a.children
        .insert("x.txt".into(), IndexNode::File(FileEntry::size_only(2)));
    let mut root = DirNode::new();
    root.children.insert("a".into(), IndexNode::Directory(a));
    root.children
        .insert("b.txt".into(), IndexNode::File(FileEntry::size_only(3)));
    let mut index = IndexNode::Directory(root);

    let mut fresh_a = DirNode::new();
    fresh_a
        .children
        .insert("x.txt".into(), IndexNode::File(FileEntry::size_only(5)));
    fresh_a
        .children
        .insert("y.txt".into(), IndexNode::File(FileEntry::size_only(1)));

    let segments = relative_segments(Path::new("/data"), Path::new("/data/a")).unwrap();
    splice(&mut index, &segments, IndexNode::Directory(fresh_a));

    let a = index.child("a").unwrap();
    assert_eq!(a.file_count(), 2);
    assert_eq!(a.child("x.txt").unwrap().as_file().unwrap().size, 5);
    // Unaffected sibling survives untouched.
    assert_eq!(index.child("b.txt").unwrap().as_file().unwrap().size, 3);
}
