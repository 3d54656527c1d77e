//! Two-phase layout of a node graph into the serialized tree format.
//!
//! Node sizes depend only on their child and hard-node counts, so every offset can be
//! computed before any reference is written. Layout is recomputed from scratch on every
//! call; it never mutates the graph.

use crate::error::TreeError;
use crate::tree::format::{TreeHeader, HEADER_LEN};
use crate::tree::graph::{BuildNode, NodeGraph};
use crate::tree::node::Node;
use std::io::Write;
use tracing::debug;

/// Absolute position of every node and name
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub node_offsets: Vec<u64>,
    pub name_offsets: Vec<u64>,
    pub name_block_offset: u64,
    pub sorting_block_offset: u64,
}

impl Layout {
    pub fn compute(graph: &NodeGraph) -> Self {
        // Names first, relative to the start of the name block
        let mut relative = Vec::with_capacity(graph.names().len());
        let mut name_cursor = 0u64;
        for name in graph.names() {
            relative.push(name_cursor);
            name_cursor += name.len() as u64 + 1;
        }

        let mut node_offsets = Vec::with_capacity(graph.len());
        let mut cursor = HEADER_LEN;
        for node in graph.nodes() {
            node_offsets.push(cursor);
            cursor +=
                Node::encoded_len_for(node.node_type, node.children.len(), node.hard_nodes.len());
        }

        let name_block_offset = cursor;
        let name_offsets = relative.into_iter().map(|r| r + name_block_offset).collect();

        Self {
            node_offsets,
            name_offsets,
            name_block_offset,
            sorting_block_offset: name_block_offset + name_cursor,
        }
    }

    /// Resolve name, parent and child indices into absolute offsets
    pub fn resolve_node(&self, node: &BuildNode) -> Node {
        Node {
            node_type: node.node_type,
            content_kind: node.content_kind,
            name_ref: node.name.map(|idx| self.name_offsets[idx]),
            parent_ref: node.parent.map(|idx| self.node_offsets[idx]),
            children: node.children.iter().map(|idx| self.node_offsets[*idx]).collect(),
            hard_node_refs: Vec::new(),
        }
    }

    /// Resolve the aggregated hard nodes of a virtual node
    pub fn resolve_hard_nodes(&self, build: &BuildNode, node: &mut Node) {
        if build.node_type.is_virtual() {
            node.hard_node_refs = build
                .hard_nodes
                .iter()
                .map(|idx| self.node_offsets[*idx])
                .collect();
        }
    }
}

/// A fully laid out tree: header, resolved node records in layout order, and names
#[derive(Debug, Clone)]
pub struct BuiltTree {
    header: TreeHeader,
    nodes: Vec<(u64, Node)>,
    names: Vec<String>,
}

impl BuiltTree {
    pub(crate) fn new(layout: &Layout, nodes: Vec<Node>, names: Vec<String>) -> Self {
        let header = TreeHeader::new(
            HEADER_LEN,
            layout.name_block_offset,
            layout.sorting_block_offset,
        );
        debug!(
            nodes = nodes.len(),
            names = names.len(),
            name_block_offset = layout.name_block_offset,
            total_len = layout.sorting_block_offset,
            "Laid out node tree"
        );
        let nodes = layout.node_offsets.iter().copied().zip(nodes).collect();
        Self {
            header,
            nodes,
            names,
        }
    }

    pub fn header(&self) -> &TreeHeader {
        &self.header
    }

    /// `(offset, node)` pairs in serialization order; the root comes first
    pub fn nodes(&self) -> &[(u64, Node)] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node stored at `offset`, if any
    pub fn node_at(&self, offset: u64) -> Option<&Node> {
        self.nodes
            .binary_search_by_key(&offset, |(o, _)| *o)
            .ok()
            .map(|idx| &self.nodes[idx].1)
    }

    /// Total serialized length in bytes
    pub fn len(&self) -> u64 {
        self.header.sorting_block_offset
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), TreeError> {
        self.header.write_to(writer)?;
        for (_, node) in &self.nodes {
            node.write_to(writer)?;
        }
        for name in &self.names {
            writer.write_all(name.as_bytes())?;
            writer.write_all(&[0])?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TreeError> {
        let mut buf = Vec::with_capacity(self.len() as usize);
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

/// Lay out `graph` and resolve every reference.
///
/// With `resolve_hard_nodes` set, a second pass fills in the hard-node lists of virtual
/// nodes once all node offsets are known.
pub(crate) fn build_tree(graph: &NodeGraph, resolve_hard_nodes: bool) -> BuiltTree {
    let layout = Layout::compute(graph);
    let mut nodes: Vec<Node> = graph.nodes().iter().map(|n| layout.resolve_node(n)).collect();
    if resolve_hard_nodes {
        for (build, node) in graph.nodes().iter().zip(nodes.iter_mut()) {
            layout.resolve_hard_nodes(build, node);
        }
    }
    BuiltTree::new(&layout, nodes, graph.names().to_vec())
}
