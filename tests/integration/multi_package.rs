use crate::support::child_named;
use nodetree::archive::{Archive, FileInfo, ListArchive};
use nodetree::{MultiPackageNodeTreeBuilder, NodeType, TreeBuilder, TreeError};

#[test]
fn same_file_in_two_packages() {
    let builder = MultiPackageNodeTreeBuilder::new();
    builder
        .consume_package("P1", &ListArchive::new(["x.txt"]))
        .unwrap();
    builder
        .consume_package("P2", &ListArchive::new(["x.txt"]))
        .unwrap();
    let tree = builder.create_reader().unwrap();
    let root = tree.root().unwrap();

    let packages = child_named(&tree, &root, "Packages").unwrap();
    assert!(packages.node_type.contains(NodeType::META));

    let mut hard_offsets = Vec::new();
    for name in ["P1", "P2"] {
        let meta_root = child_named(&tree, &packages, name).unwrap();
        assert!(meta_root.node_type.contains(NodeType::PACKAGE));
        let hard = child_named(&tree, &meta_root, "x.txt").unwrap();
        assert!(!hard.node_type.is_virtual());
        hard_offsets.push(tree.get_node_offset(&hard).unwrap());
    }

    let virtual_x = tree
        .children(&root)
        .unwrap()
        .into_iter()
        .find(|n| n.node_type.is_virtual() && tree.get_node_name(n).unwrap() == "x.txt")
        .unwrap();
    assert_eq!(virtual_x.hard_node_refs, hard_offsets);
}

#[test]
fn virtual_type_is_union_of_hard_types() {
    let builder = MultiPackageNodeTreeBuilder::new();
    builder
        .consume_package("A", &ListArchive::new(["x\\y.txt"]))
        .unwrap();
    let deleted = ListArchive::default().with_entry(
        "x\\y.txt",
        FileInfo {
            exists: true,
            deleted: true,
        },
    );
    builder.consume_package("B", &deleted).unwrap();

    let tree = builder.create_reader().unwrap();
    let y = tree.find("x\\y.txt").unwrap().unwrap();
    assert!(y
        .node_type
        .contains(NodeType::VIRTUAL | NodeType::FILE | NodeType::DELETED));

    let hard = tree.hard_nodes(&y).unwrap();
    assert_eq!(hard.len(), 2);
    let paths: Vec<String> = hard.iter().map(|n| tree.node_path(n).unwrap()).collect();
    assert_eq!(
        paths,
        vec!["Packages\\A\\x\\y.txt", "Packages\\B\\x\\y.txt"]
    );
    assert!(!hard[0].node_type.contains(NodeType::DELETED));
    assert!(hard[1].node_type.contains(NodeType::DELETED));

    let x = tree.find("x").unwrap().unwrap();
    assert!(x.node_type.contains(NodeType::VIRTUAL | NodeType::DIRECTORY));
    assert_eq!(tree.hard_nodes(&x).unwrap().len(), 2);
}

#[test]
fn single_paths_are_rejected() {
    let mut builder = MultiPackageNodeTreeBuilder::new();
    assert!(matches!(
        builder.add_path("x.txt"),
        Err(TreeError::InvalidOperation(_))
    ));
    assert_eq!(builder.node_count(), 2);
}

/// An archive that can list its entries but fails on every lookup
struct UnreadableArchive;

impl Archive for UnreadableArchive {
    fn has_file_list(&self) -> bool {
        true
    }

    fn file_list(&self) -> Result<Vec<String>, TreeError> {
        Ok(vec!["broken\\entry.txt".to_string()])
    }

    fn file_info(&self, path: &str) -> Result<FileInfo, TreeError> {
        Err(TreeError::Archive {
            archive: "unreadable".to_string(),
            message: format!("cannot stat {}", path),
        })
    }
}

#[test]
fn failed_archive_keeps_earlier_packages() {
    let builder = MultiPackageNodeTreeBuilder::new();
    builder
        .consume_package("good", &ListArchive::new(["a.txt"]))
        .unwrap();

    match builder.consume_package("bad", &UnreadableArchive) {
        Err(TreeError::Archive { archive, message }) => {
            assert_eq!(archive, "unreadable");
            assert_eq!(message, "cannot stat broken\\entry.txt");
        }
        other => panic!("expected the archive error unchanged, got {:?}", other),
    }

    let tree = builder.create_reader().unwrap();
    assert!(tree.find("a.txt").unwrap().is_some());
    assert!(tree.find("Packages\\good\\a.txt").unwrap().is_some());
    assert!(tree.find("broken").unwrap().is_none());
}
