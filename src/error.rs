//! Error types for tree construction, tree reading, and the tooling layer.

use thiserror::Error;

/// Errors raised by the builders and the reader
#[derive(Debug, Error)]
pub enum TreeError {
    /// The serialized header carries a version this reader does not understand
    #[error("Unsupported node tree format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// The header block offsets are inconsistent with each other or the buffer
    #[error("Corrupt node tree header: {0}")]
    CorruptHeader(String),

    /// An offset that points outside the node block
    #[error("Offset {0} does not address a node")]
    InvalidOffset(u64),

    /// A record or name ran past the end of the buffer
    #[error("Node tree truncated while reading at offset {0}")]
    Truncated(u64),

    /// Parent or child references loop back on themselves
    #[error("Reference cycle through node at offset {0}")]
    ReferenceCycle(u64),

    /// A name in the name block is not valid UTF-8
    #[error("Invalid name at offset {0}")]
    InvalidName(u64),

    /// A path or archive name that cannot be stored in the tree
    #[error("Invalid path {0:?}: {1}")]
    InvalidPath(String, &'static str),

    /// The operation is not supported by this builder variant
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// An archive collaborator failed
    #[error("Archive error ({archive}): {message}")]
    Archive { archive: String, message: String },

    /// A classifier collaborator failed
    #[error("Classifier error for {name}: {message}")]
    Classifier { name: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by configuration, logging, and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Node tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Path not found in tree: {0}")]
    PathNotInTree(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
