//! Core value types shared by the builders and the reader.

use bitflags::bitflags;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Canonical separator for paths inside the tree
pub const PATH_SEPARATOR: char = '\\';

bitflags! {
    /// Role of a node in the tree: one structural kind plus modifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeType: u32 {
        const DIRECTORY = 0x01;
        const FILE = 0x02;
        const META = 0x04;
        const VIRTUAL = 0x08;
        const DELETED = 0x10;
        const NONEXISTENT = 0x20;
        const PACKAGE = 0x40;
    }
}

impl NodeType {
    pub fn is_directory(self) -> bool {
        self.contains(NodeType::DIRECTORY)
    }

    pub fn is_file(self) -> bool {
        self.contains(NodeType::FILE)
    }

    pub fn is_virtual(self) -> bool {
        self.contains(NodeType::VIRTUAL)
    }

    /// Human readable flag list, e.g. `Directory|Meta`
    pub fn describe(self) -> String {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        if names.is_empty() {
            return "None".to_string();
        }
        names
            .iter()
            .map(|name| {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Opaque content classification tag supplied by a [`crate::archive::Classifier`]
///
/// Tags are bitmasks so that a directory can carry the union of everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ContentKind(pub u64);

impl ContentKind {
    pub const UNKNOWN: ContentKind = ContentKind(0);

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`
    pub const fn contains(self, other: ContentKind) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ContentKind {
    type Output = ContentKind;

    fn bitor(self, rhs: ContentKind) -> ContentKind {
        ContentKind(self.0 | rhs.0)
    }
}

impl BitOrAssign for ContentKind {
    fn bitor_assign(&mut self, rhs: ContentKind) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Normalize a path to the canonical separator and split it into non-empty components
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(|c| c == '/' || c == '\\')
        .filter(|component| !component.is_empty())
        .collect()
}
