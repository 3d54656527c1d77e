//! Multi-archive tree builder
//!
//! Every archive gets a meta-root under the packages folder holding its *hard* nodes,
//! namespaced by the archive name. Next to the packages folder, the root carries a
//! namespace-less *virtual* tree: one node per distinct path, aggregating every hard node
//! that shares the path.
//!
//! ```text
//! <root>
//! ├── Packages            Meta
//! │   ├── P1              Meta | Package
//! │   │   └── x.txt       hard, namespace "P1"
//! │   └── P2              Meta | Package
//! │       └── x.txt       hard, namespace "P2"
//! └── x.txt               Virtual, hard nodes = [P1/x.txt, P2/x.txt]
//! ```

use crate::archive::{Archive, Classifier, ExtensionClassifier, PathOptimizer};
use crate::config::{BuildConfig, DEFAULT_PACKAGES_FOLDER};
use crate::error::TreeError;
use crate::tree::builder::TreeBuilder;
use crate::tree::graph::{NodeGraph, ROOT_INDEX};
use crate::tree::identifier::NodeIdentifier;
use crate::tree::layout::{build_tree, BuiltTree};
use crate::types::{split_path, ContentKind, NodeType, PATH_SEPARATOR};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds a tree merging the hierarchies of several archives.
///
/// Packages may be consumed from several threads at once as long as each call uses a
/// distinct archive name; every graph mutation goes through one lock.
pub struct MultiPackageNodeTreeBuilder {
    graph: Mutex<NodeGraph>,
    packages_index: usize,
    classifier: Arc<dyn Classifier>,
    optimizer: Option<Arc<dyn PathOptimizer>>,
}

impl MultiPackageNodeTreeBuilder {
    /// Create a builder with the root and the default `Packages` meta folder
    pub fn new() -> Self {
        Self::with_packages_folder(
            DEFAULT_PACKAGES_FOLDER,
            Arc::new(ExtensionClassifier::default()),
        )
    }

    /// Create a builder using the configured packages folder name.
    ///
    /// Fails if the folder name is empty or contains a separator or NUL.
    pub fn with_config(
        config: &BuildConfig,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, TreeError> {
        validate_package_name(&config.packages_folder)?;
        Ok(Self::with_packages_folder(&config.packages_folder, classifier))
    }

    fn with_packages_folder(folder: &str, classifier: Arc<dyn Classifier>) -> Self {
        let mut graph = NodeGraph::new();
        let packages_index = graph.insert_validated(
            NodeIdentifier::meta(folder),
            NodeType::DIRECTORY | NodeType::META,
            ContentKind::UNKNOWN,
            folder,
            ROOT_INDEX,
        );
        Self {
            graph: Mutex::new(graph),
            packages_index,
            classifier,
            optimizer: None,
        }
    }

    pub fn with_path_optimizer(mut self, optimizer: Arc<dyn PathOptimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Consume every path of `archive` under the meta-root named `name`.
    ///
    /// Collaborator errors are returned as-is; whatever was consumed before the failure
    /// stays in the graph.
    pub fn consume_package(&self, name: &str, archive: &dyn Archive) -> Result<(), TreeError> {
        validate_package_name(name)?;
        let meta_root = {
            let mut graph = self.graph.lock();
            graph.insert(
                NodeIdentifier::new(name, ""),
                NodeType::DIRECTORY | NodeType::META | NodeType::PACKAGE,
                ContentKind::UNKNOWN,
                name,
                self.packages_index,
            )?
        };

        if !archive.has_file_list() {
            warn!(package = name, "Archive does not provide a file list");
            return Err(TreeError::Archive {
                archive: name.to_string(),
                message: "Archive does not provide a file list".to_string(),
            });
        }
        let paths = archive.file_list()?;
        info!(package = name, paths = paths.len(), "Consuming package");

        for path in &paths {
            self.consume_path(name, meta_root, archive, path)?;
        }
        debug!(package = name, nodes = self.node_count(), "Package consumed");
        Ok(())
    }

    /// Create the hard nodes for `path` and their virtual counterparts.
    ///
    /// Archive lookups and classification happen before the graph lock is taken.
    fn consume_path(
        &self,
        archive_name: &str,
        meta_root: usize,
        archive: &dyn Archive,
        path: &str,
    ) -> Result<(), TreeError> {
        let optimized = match &self.optimizer {
            Some(optimizer) => optimizer.optimize(path),
            None => path.to_string(),
        };
        let components = split_path(&optimized);
        let Some(file_name) = components.last() else {
            return Ok(());
        };
        // The archive is asked about its own spelling of the path
        let info = archive.file_info(path)?;
        let file_kind = self.classifier.classify(file_name)?;
        let mut file_type = NodeType::FILE;
        if !info.exists {
            file_type |= NodeType::NONEXISTENT;
        }
        if info.deleted {
            file_type |= NodeType::DELETED;
        }

        let last = components.len() - 1;
        let mut graph = self.graph.lock();
        let mut parent = meta_root;
        for (depth, component) in components.iter().enumerate() {
            let id = NodeIdentifier::from_components(archive_name, &components[..=depth]);
            if let Some(existing) = graph.get(&id) {
                parent = existing;
                continue;
            }

            let (node_type, kind) = if depth == last {
                (file_type, file_kind)
            } else {
                (NodeType::DIRECTORY, ContentKind::UNKNOWN)
            };
            let idx = graph.insert(id.clone(), node_type, kind, component, parent)?;
            graph.propagate_kind(parent, kind);
            create_or_update_virtual_node(&mut graph, idx, &id)?;
            parent = idx;
        }
        Ok(())
    }

    /// Number of packages consumed so far
    pub fn package_count(&self) -> usize {
        let graph = self.graph.lock();
        graph.node(self.packages_index).children.len()
    }
}

impl Default for MultiPackageNodeTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder for MultiPackageNodeTreeBuilder {
    fn add_path(&mut self, _path: &str) -> Result<(), TreeError> {
        Err(TreeError::InvalidOperation(
            "single paths cannot be added to a multi-package tree; use consume_package",
        ))
    }

    fn build(&self) -> Result<BuiltTree, TreeError> {
        let graph = self.graph.lock();
        debug!(
            nodes = graph.len(),
            packages = graph.node(self.packages_index).children.len(),
            "Building multi-package node tree"
        );
        Ok(build_tree(&graph, true))
    }

    fn node_count(&self) -> usize {
        self.graph.lock().len()
    }
}

/// Attach the hard node `hard_idx` to the virtual node sharing its path, creating the
/// virtual node under its virtual parent when it does not exist yet.
fn create_or_update_virtual_node(
    graph: &mut NodeGraph,
    hard_idx: usize,
    hard_id: &NodeIdentifier,
) -> Result<usize, TreeError> {
    let virtual_id = hard_id.to_virtual();
    let hard_type = graph.node(hard_idx).node_type;
    let hard_kind = graph.node(hard_idx).content_kind;

    let virtual_idx = match graph.get(&virtual_id) {
        Some(idx) => idx,
        None => {
            // Prefixes are consumed shortest first, so the virtual parent already exists
            let parent = virtual_id
                .parent()
                .and_then(|parent_id| graph.get(&parent_id))
                .unwrap_or(ROOT_INDEX);
            graph.insert(
                virtual_id.clone(),
                hard_type | NodeType::VIRTUAL,
                ContentKind::UNKNOWN,
                virtual_id.terminal(),
                parent,
            )?
        }
    };

    graph.propagate_kind(virtual_idx, hard_kind);
    graph.node_mut(virtual_idx).node_type |= hard_type;
    graph.add_hard_node(virtual_idx, hard_idx);
    Ok(virtual_idx)
}

fn validate_package_name(name: &str) -> Result<(), TreeError> {
    if name.is_empty() {
        return Err(TreeError::InvalidPath(
            name.to_string(),
            "package name must not be empty",
        ));
    }
    if name.contains(|c| c == '/' || c == PATH_SEPARATOR || c == '\0') {
        return Err(TreeError::InvalidPath(
            name.to_string(),
            "package name must not contain separators or NUL",
        ));
    }
    Ok(())
}
