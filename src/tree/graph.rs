//! Build-time node arena
//!
//! Nodes live in a growable vector and refer to each other by index. Identifiers map to
//! indices, names are interned into an ordered, deduplicated list. Nothing in here knows
//! about byte offsets; those are assigned by [`crate::tree::layout`].

use crate::error::TreeError;
use crate::tree::identifier::NodeIdentifier;
use crate::types::{ContentKind, NodeType};
use std::collections::HashMap;

/// Arena index of the synthetic root
pub(crate) const ROOT_INDEX: usize = 0;

/// A node whose references are still arena indices
#[derive(Debug, Clone)]
pub(crate) struct BuildNode {
    pub node_type: NodeType,
    pub content_kind: ContentKind,
    /// Index into the name list; `None` only for the root
    pub name: Option<usize>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub hard_nodes: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct NodeGraph {
    nodes: Vec<BuildNode>,
    index: HashMap<NodeIdentifier, usize>,
    names: Vec<String>,
    name_index: HashMap<String, usize>,
}

impl NodeGraph {
    pub fn new() -> Self {
        let root = BuildNode {
            node_type: NodeType::DIRECTORY,
            content_kind: ContentKind::UNKNOWN,
            name: None,
            parent: None,
            children: Vec::new(),
            hard_nodes: Vec::new(),
        };
        let mut index = HashMap::new();
        index.insert(NodeIdentifier::root(), ROOT_INDEX);
        Self {
            nodes: vec![root],
            index,
            names: Vec::new(),
            name_index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[BuildNode] {
        &self.nodes
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, id: &NodeIdentifier) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: usize) -> &BuildNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: usize) -> &mut BuildNode {
        &mut self.nodes[idx]
    }

    /// Register `name` once and return its position in the name list
    pub fn intern_name(&mut self, name: &str) -> usize {
        if let Some(idx) = self.name_index.get(name) {
            return *idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.name_index.insert(name.to_string(), idx);
        idx
    }

    /// Create a node for `id` under `parent` and link it into the parent's child list.
    ///
    /// Callers check [`NodeGraph::get`] first; inserting an existing identifier returns the
    /// existing index unchanged.
    pub fn insert(
        &mut self,
        id: NodeIdentifier,
        node_type: NodeType,
        content_kind: ContentKind,
        name: &str,
        parent: usize,
    ) -> Result<usize, TreeError> {
        if let Some(existing) = self.index.get(&id) {
            return Ok(*existing);
        }
        validate_name(name)?;
        Ok(self.insert_validated(id, node_type, content_kind, name, parent))
    }

    /// [`NodeGraph::insert`] for a name the caller has already validated
    pub fn insert_validated(
        &mut self,
        id: NodeIdentifier,
        node_type: NodeType,
        content_kind: ContentKind,
        name: &str,
        parent: usize,
    ) -> usize {
        if let Some(existing) = self.index.get(&id) {
            return *existing;
        }
        let name = self.intern_name(name);
        let idx = self.nodes.len();
        self.nodes.push(BuildNode {
            node_type,
            content_kind,
            name: Some(name),
            parent: Some(parent),
            children: Vec::new(),
            hard_nodes: Vec::new(),
        });
        self.nodes[parent].children.push(idx);
        self.index.insert(id, idx);
        idx
    }

    /// OR `kind` into `start` and its ancestors.
    ///
    /// Stops at the first node that already carries every bit of `kind`: that node's
    /// ancestors were updated when those bits first reached it.
    pub fn propagate_kind(&mut self, start: usize, kind: ContentKind) {
        let mut current = Some(start);
        while let Some(idx) = current {
            let node = &mut self.nodes[idx];
            if node.content_kind.contains(kind) {
                break;
            }
            node.content_kind |= kind;
            current = node.parent;
        }
    }

    pub fn add_hard_node(&mut self, virtual_idx: usize, hard_idx: usize) {
        self.nodes[virtual_idx].hard_nodes.push(hard_idx);
    }
}

/// Names end up null-terminated in the name block, so they must not contain NUL
fn validate_name(name: &str) -> Result<(), TreeError> {
    if name.is_empty() {
        return Err(TreeError::InvalidPath(name.to_string(), "empty name"));
    }
    if name.contains('\0') {
        return Err(TreeError::InvalidPath(name.to_string(), "name contains NUL"));
    }
    Ok(())
}
