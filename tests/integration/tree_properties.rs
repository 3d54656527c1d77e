use nodetree::{NodeTreeBuilder, OptimizedNodeTree, TreeBuilder};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Paths of up to three directory levels ending in a `.txt` file. Directory names never
/// carry an extension, so no generated file is ever a prefix of another path.
fn path_strategy() -> impl Strategy<Value = Vec<String>> {
    let dir = prop::sample::select(vec!["a", "b", "docs", "src"]);
    let file = "[a-d]{1,3}".prop_map(|stem| format!("{}.txt", stem));
    prop::collection::vec(
        (prop::collection::vec(dir, 0..3), file, any::<bool>()).prop_map(
            |(dirs, file, forward)| {
                let mut parts: Vec<String> = dirs.into_iter().map(String::from).collect();
                parts.push(file);
                parts.join(if forward { "/" } else { "\\" })
            },
        ),
        0..24,
    )
}

fn normalize(path: &str) -> String {
    nodetree::types::split_path(path).join("\\")
}

fn build(paths: &[String]) -> Vec<u8> {
    let mut builder = NodeTreeBuilder::new();
    builder.add_paths(paths).unwrap();
    builder.create_tree().unwrap()
}

proptest! {
    #[test]
    fn read_back_paths_match_input(paths in path_strategy()) {
        let tree = OptimizedNodeTree::from_bytes(build(&paths)).unwrap();
        let expected: BTreeSet<String> = paths.iter().map(|p| normalize(p)).collect();

        let read: BTreeSet<String> = tree.file_paths().unwrap().into_iter().collect();
        prop_assert_eq!(&read, &expected);

        // Rebuilding each path from its parent links gives the same answer
        for (path, node) in tree.entries().unwrap() {
            prop_assert_eq!(tree.node_path(&node).unwrap(), path);
        }
    }

    #[test]
    fn consuming_twice_is_byte_identical(paths in path_strategy()) {
        let once = build(&paths);
        let mut doubled = paths.clone();
        doubled.extend(paths.iter().cloned());
        prop_assert_eq!(build(&doubled), once);
    }

    #[test]
    fn every_reference_resolves(paths in path_strategy()) {
        let tree = OptimizedNodeTree::from_bytes(build(&paths)).unwrap();
        let root = tree.root().unwrap();
        let root_offset = tree.get_node_offset(&root).unwrap();
        prop_assert!(tree.parent(&root).unwrap().is_none());

        let mut nodes = vec![(root_offset, root)];
        nodes.extend(
            tree.entries()
                .unwrap()
                .into_iter()
                .map(|(_, n)| (tree.get_node_offset(&n).unwrap(), n)),
        );
        for (offset, node) in nodes {
            if node.name_ref.is_some() {
                prop_assert!(!tree.get_node_name(&node).unwrap().is_empty());
            }
            for child in tree.children(&node).unwrap() {
                prop_assert_eq!(child.parent_ref, Some(offset));
            }
        }
    }

    #[test]
    fn ancestors_carry_descendant_kinds(paths in path_strategy()) {
        let tree = OptimizedNodeTree::from_bytes(build(&paths)).unwrap();
        for (_, node) in tree.entries().unwrap() {
            let mut ancestor = tree.parent(&node).unwrap();
            while let Some(parent) = ancestor {
                prop_assert!(parent.content_kind.contains(node.content_kind));
                ancestor = tree.parent(&parent).unwrap();
            }
        }
    }
}
