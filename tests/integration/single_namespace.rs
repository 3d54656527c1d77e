use crate::support::child_named;
use nodetree::archive::classifier::KIND_TEXT;
use nodetree::{NodeTreeBuilder, NodeType, OptimizedNodeTree, TreeBuilder, TreeError};
use std::sync::Arc;

#[test]
fn two_files_share_one_directory() {
    let mut builder = NodeTreeBuilder::new();
    builder.add_paths(["a\\b.txt", "a\\c.txt"]).unwrap();
    let tree = builder.create_reader().unwrap();

    let root = tree.root().unwrap();
    assert_eq!(root.children.len(), 1);
    assert!(root.node_type.is_directory());

    let a = tree.get_node(root.children[0]).unwrap().unwrap();
    assert_eq!(tree.get_node_name(&a).unwrap(), "a");
    assert!(a.node_type.is_directory());
    assert_eq!(a.children.len(), 2);

    let again = tree.get_node(root.children[0]).unwrap().unwrap();
    assert!(Arc::ptr_eq(&a, &again));

    let names: Vec<String> = tree
        .children(&a)
        .unwrap()
        .iter()
        .map(|leaf| {
            assert_eq!(leaf.node_type, NodeType::FILE);
            tree.get_node_name(leaf).unwrap()
        })
        .collect();
    assert_eq!(names, vec!["b.txt", "c.txt"]);
}

#[test]
fn kind_reaches_every_ancestor() {
    let mut builder = NodeTreeBuilder::new();
    builder.add_path("deep\\er\\still\\notes.txt").unwrap();
    let tree = builder.create_reader().unwrap();

    let mut node = tree.find("deep\\er\\still\\notes.txt").unwrap().unwrap();
    loop {
        assert!(node.content_kind.contains(KIND_TEXT));
        match tree.parent(&node).unwrap() {
            Some(parent) => node = parent,
            None => break,
        }
    }
    assert!(node.is_root());
}

#[test]
fn file_backed_reader_matches_memory_reader() {
    let mut builder = NodeTreeBuilder::new();
    builder
        .add_paths(["docs\\a.md", "docs\\b.md", "src\\main.rs"])
        .unwrap();
    let bytes = builder.create_tree().unwrap();

    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("tree.bin");
    std::fs::write(&path, &bytes).unwrap();

    let on_disk = OptimizedNodeTree::open(&path).unwrap();
    let in_memory = OptimizedNodeTree::from_bytes(bytes).unwrap();
    assert_eq!(on_disk.header(), in_memory.header());
    assert_eq!(on_disk.file_paths().unwrap(), in_memory.file_paths().unwrap());

    let docs = child_named(&on_disk, &on_disk.root().unwrap(), "docs").unwrap();
    assert_eq!(docs.children.len(), 2);
}

#[test]
fn other_versions_are_rejected() {
    let mut bytes = NodeTreeBuilder::new().create_tree().unwrap();
    bytes[0..4].copy_from_slice(&7u32.to_le_bytes());
    match OptimizedNodeTree::from_bytes(bytes) {
        Err(TreeError::UnsupportedVersion { found, expected }) => {
            assert_eq!(found, 7);
            assert_eq!(expected, nodetree::tree::FORMAT_VERSION);
        }
        other => panic!("expected version rejection, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn garbage_offsets_are_reported() {
    let mut builder = NodeTreeBuilder::new();
    builder.add_path("a.txt").unwrap();
    let tree = builder.create_reader().unwrap();
    let past_nodes = tree.header().name_block_offset + 3;
    assert!(matches!(
        tree.get_node(past_nodes),
        Err(TreeError::InvalidOffset(_))
    ));
}
