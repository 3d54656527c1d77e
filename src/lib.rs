//! Nodetree: offset-addressed node trees
//!
//! Builds a compact binary encoding of a path hierarchy, optionally merging the file lists
//! of several archives into one tree where each shared path is a virtual node that points
//! at every archive's own copy. Trees are read back lazily and can be shared across
//! threads.

pub mod archive;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod tooling;
pub mod tree;
pub mod types;

pub use archive::{Archive, Classifier, FileInfo, PathOptimizer};
pub use error::{ApiError, TreeError};
pub use tree::{
    BuiltTree, MultiPackageNodeTreeBuilder, Node, NodeIdentifier, NodeTreeBuilder,
    OptimizedNodeTree, TreeBuilder, TreeHeader,
};
pub use types::{ContentKind, NodeType, PATH_SEPARATOR};
