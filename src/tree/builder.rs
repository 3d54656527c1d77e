//! Single-namespace tree builder

use crate::archive::{Classifier, ExtensionClassifier, PathOptimizer};
use crate::error::TreeError;
use crate::tree::graph::{NodeGraph, ROOT_INDEX};
use crate::tree::identifier::NodeIdentifier;
use crate::tree::layout::{build_tree, BuiltTree};
use crate::tree::reader::OptimizedNodeTree;
use crate::types::{split_path, ContentKind, NodeType};
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// Common surface of the tree builders
pub trait TreeBuilder {
    /// Consume one path. Empty and already consumed paths are no-ops.
    fn add_path(&mut self, path: &str) -> Result<(), TreeError>;

    /// Lay out every node consumed so far. May be called repeatedly.
    fn build(&self) -> Result<BuiltTree, TreeError>;

    /// Number of nodes in the graph, root included
    fn node_count(&self) -> usize;

    /// Build and serialize the tree
    fn create_tree(&self) -> Result<Vec<u8>, TreeError> {
        self.build()?.to_bytes()
    }

    /// Build the tree and open a reader directly over the serialized bytes
    fn create_reader(&self) -> Result<OptimizedNodeTree<Cursor<Vec<u8>>>, TreeError> {
        OptimizedNodeTree::from_bytes(self.create_tree()?)
    }
}

/// Builds a tree from plain paths in the shared namespace
pub struct NodeTreeBuilder {
    graph: NodeGraph,
    classifier: Arc<dyn Classifier>,
    optimizer: Option<Arc<dyn PathOptimizer>>,
}

impl NodeTreeBuilder {
    /// Create a builder holding only the root, using the default extension classifier
    pub fn new() -> Self {
        Self::with_classifier(Arc::new(ExtensionClassifier::default()))
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            graph: NodeGraph::new(),
            classifier,
            optimizer: None,
        }
    }

    /// Rewrite every path with `optimizer` before it is consumed
    pub fn with_path_optimizer(mut self, optimizer: Arc<dyn PathOptimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Consume every path of `paths`
    pub fn add_paths<I, S>(&mut self, paths: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.add_path(path.as_ref())?;
        }
        Ok(())
    }

    /// Content kind accumulated at `path` so far, if the path has been consumed
    pub fn content_kind(&self, path: &str) -> Option<ContentKind> {
        let components = split_path(path);
        let id = NodeIdentifier::from_components("", &components);
        self.graph
            .get(&id)
            .map(|idx| self.graph.node(idx).content_kind)
    }
}

impl Default for NodeTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder for NodeTreeBuilder {
    fn add_path(&mut self, path: &str) -> Result<(), TreeError> {
        let path = match &self.optimizer {
            Some(optimizer) => optimizer.optimize(path),
            None => path.to_string(),
        };
        let components = split_path(&path);
        let last = components.len().saturating_sub(1);

        let mut parent = ROOT_INDEX;
        for (depth, component) in components.iter().enumerate() {
            let id = NodeIdentifier::from_components("", &components[..=depth]);
            if let Some(existing) = self.graph.get(&id) {
                parent = existing;
                continue;
            }

            let (node_type, kind) = if depth == last {
                (NodeType::FILE, self.classifier.classify(component)?)
            } else {
                (NodeType::DIRECTORY, ContentKind::UNKNOWN)
            };
            let idx = self.graph.insert(id, node_type, kind, component, parent)?;
            self.graph.propagate_kind(parent, kind);
            parent = idx;
        }
        Ok(())
    }

    fn build(&self) -> Result<BuiltTree, TreeError> {
        debug!(nodes = self.graph.len(), "Building node tree");
        Ok(build_tree(&self.graph, false))
    }

    fn node_count(&self) -> usize {
        self.graph.len()
    }
}
