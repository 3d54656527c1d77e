use nodetree::{Node, OptimizedNodeTree};
use std::io::{Read, Seek};
use std::sync::Arc;

/// Child of `parent` named `name`, if any
pub fn child_named<R: Read + Seek>(
    tree: &OptimizedNodeTree<R>,
    parent: &Node,
    name: &str,
) -> Option<Arc<Node>> {
    tree.children(parent)
        .unwrap()
        .into_iter()
        .find(|child| tree.get_node_name(child).unwrap() == name)
}
