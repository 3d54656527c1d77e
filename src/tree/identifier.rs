//! Build-time node identity

use crate::types::PATH_SEPARATOR;

/// Namespace reserved for structural meta nodes such as the packages folder.
///
/// Contains a NUL byte so it can never collide with an archive name.
pub(crate) const META_NAMESPACE: &str = "\0meta";

/// Identifies a node in the build-time graph: an archive namespace plus a canonical path.
///
/// The namespace is empty for the synthetic root and for virtual (shared) nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentifier {
    namespace: String,
    path: String,
}

impl NodeIdentifier {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// The synthetic root `("", "")`
    pub fn root() -> Self {
        Self::new("", "")
    }

    /// Identifier for the prefix made of `components`, joined with the canonical separator
    pub fn from_components(namespace: &str, components: &[&str]) -> Self {
        let mut buf = [0u8; 4];
        let sep: &str = PATH_SEPARATOR.encode_utf8(&mut buf);
        Self::new(namespace, components.join(sep))
    }

    pub(crate) fn meta(name: &str) -> Self {
        Self::new(META_NAMESPACE, name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True for nodes of the shared tree (and the root)
    pub fn is_virtual(&self) -> bool {
        self.namespace.is_empty()
    }

    /// The identifier of the same path in the shared namespace
    pub fn to_virtual(&self) -> Self {
        Self::new("", self.path.clone())
    }

    /// Parent identifier within the same namespace.
    ///
    /// A top-level path's parent is the namespace root `(namespace, "")`; the namespace root
    /// itself has no parent inside its namespace.
    pub fn parent(&self) -> Option<Self> {
        if self.path.is_empty() {
            return None;
        }
        let parent_path = match self.path.rfind(PATH_SEPARATOR) {
            Some(pos) => &self.path[..pos],
            None => "",
        };
        Some(Self::new(self.namespace.clone(), parent_path))
    }

    /// Last path component, empty for a namespace root
    pub fn terminal(&self) -> &str {
        match self.path.rfind(PATH_SEPARATOR) {
            Some(pos) => &self.path[pos + PATH_SEPARATOR.len_utf8()..],
            None => &self.path,
        }
    }
}
