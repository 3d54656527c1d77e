//! Collaborators consumed by the builders
//!
//! The builders only ever talk to archives, classifiers and path optimizers through the
//! traits below. The crate ships small implementations used by the CLI and the tests.

pub mod classifier;
pub mod directory;
pub mod list;

use crate::error::TreeError;
use crate::types::ContentKind;

pub use classifier::{ExtensionClassifier, IdentityOptimizer};
pub use directory::DirectoryArchive;
pub use list::ListArchive;

/// Existence flags reported by an archive for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub exists: bool,
    pub deleted: bool,
}

impl FileInfo {
    pub const PRESENT: FileInfo = FileInfo {
        exists: true,
        deleted: false,
    };
}

impl Default for FileInfo {
    fn default() -> Self {
        Self::PRESENT
    }
}

/// A source of paths, e.g. a package file or a directory on disk
pub trait Archive: Send + Sync {
    /// Whether the archive can enumerate its entries at all
    fn has_file_list(&self) -> bool;

    /// Every file path in the archive, using `/` or `\` as separator
    fn file_list(&self) -> Result<Vec<String>, TreeError>;

    fn file_info(&self, path: &str) -> Result<FileInfo, TreeError>;
}

/// Assigns a content kind to a file name
pub trait Classifier: Send + Sync {
    fn classify(&self, name: &str) -> Result<ContentKind, TreeError>;
}

/// Rewrites a path before it enters a builder (e.g. to fix up casing)
pub trait PathOptimizer: Send + Sync {
    fn optimize(&self, path: &str) -> String;
}
