//! Node trees: build-time graph, layout, serialized records and the reader

pub mod builder;
pub mod format;
mod graph;
pub mod identifier;
pub mod layout;
pub mod multi;
pub mod node;
pub mod reader;

pub use builder::{NodeTreeBuilder, TreeBuilder};
pub use format::{TreeHeader, FORMAT_VERSION, HEADER_LEN};
pub use identifier::NodeIdentifier;
pub use layout::BuiltTree;
pub use multi::MultiPackageNodeTreeBuilder;
pub use node::Node;
pub use reader::OptimizedNodeTree;
