use nodetree::{NodeTreeBuilder, OptimizedNodeTree, TreeBuilder};
use std::sync::Arc;
use std::thread;

fn wide_tree() -> OptimizedNodeTree {
    let mut builder = NodeTreeBuilder::new();
    for dir in 0..16 {
        for file in 0..16 {
            builder
                .add_path(&format!("dir{}\\file{}.txt", dir, file))
                .unwrap();
        }
    }
    builder.create_reader().unwrap()
}

#[test]
fn readers_on_many_threads_agree() {
    let tree = Arc::new(wide_tree());
    let expected = tree.file_paths().unwrap().len();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || tree.file_paths().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), expected);
    }
    assert_eq!(expected, 256);
}

#[test]
fn racing_lookups_share_one_decoded_node() {
    let tree = Arc::new(wide_tree());
    let offset = tree.root().unwrap().children[5];

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || tree.get_node(offset).unwrap().unwrap())
        })
        .collect();
    let nodes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for node in &nodes[1..] {
        assert!(Arc::ptr_eq(&nodes[0], node));
    }
    assert_eq!(tree.get_node_offset(&nodes[0]), Some(offset));
}
