//! Extension based classifier and the no-op path optimizer

use super::{Classifier, PathOptimizer};
use crate::error::TreeError;
use crate::types::ContentKind;
use std::collections::HashMap;

pub const KIND_TEXT: ContentKind = ContentKind(0x01);
pub const KIND_IMAGE: ContentKind = ContentKind(0x02);
pub const KIND_AUDIO: ContentKind = ContentKind(0x04);
pub const KIND_MODEL: ContentKind = ContentKind(0x08);
pub const KIND_DATA: ContentKind = ContentKind(0x10);
pub const KIND_SCRIPT: ContentKind = ContentKind(0x20);
/// Anything with an extension missing from the table
pub const KIND_OTHER: ContentKind = ContentKind(1 << 63);

/// Classifies file names by their (case-insensitive) extension
#[derive(Debug, Clone)]
pub struct ExtensionClassifier {
    table: HashMap<String, ContentKind>,
    fallback: ContentKind,
}

impl ExtensionClassifier {
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
            fallback: KIND_OTHER,
        }
    }

    /// Add or replace the kind for an extension (without the leading dot)
    pub fn with_extension(mut self, extension: &str, kind: ContentKind) -> Self {
        self.table
            .insert(extension.trim_start_matches('.').to_lowercase(), kind);
        self
    }

    /// Extend the table from configuration
    pub fn with_overrides(mut self, overrides: &HashMap<String, u64>) -> Self {
        for (extension, bits) in overrides {
            self = self.with_extension(extension, ContentKind(*bits));
        }
        self
    }

    pub fn kind_for(&self, name: &str) -> ContentKind {
        match name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => self
                .table
                .get(&extension.to_lowercase())
                .copied()
                .unwrap_or(self.fallback),
            _ => self.fallback,
        }
    }
}

impl Default for ExtensionClassifier {
    fn default() -> Self {
        let defaults: [(&str, ContentKind); 20] = [
            ("txt", KIND_TEXT),
            ("md", KIND_TEXT),
            ("log", KIND_TEXT),
            ("png", KIND_IMAGE),
            ("jpg", KIND_IMAGE),
            ("jpeg", KIND_IMAGE),
            ("dds", KIND_IMAGE),
            ("tga", KIND_IMAGE),
            ("wav", KIND_AUDIO),
            ("ogg", KIND_AUDIO),
            ("mp3", KIND_AUDIO),
            ("obj", KIND_MODEL),
            ("fbx", KIND_MODEL),
            ("json", KIND_DATA),
            ("xml", KIND_DATA),
            ("toml", KIND_DATA),
            ("ini", KIND_DATA),
            ("lua", KIND_SCRIPT),
            ("py", KIND_SCRIPT),
            ("js", KIND_SCRIPT),
        ];
        defaults
            .iter()
            .fold(Self::empty(), |classifier, (extension, kind)| {
                classifier.with_extension(extension, *kind)
            })
    }
}

impl Classifier for ExtensionClassifier {
    fn classify(&self, name: &str) -> Result<ContentKind, TreeError> {
        Ok(self.kind_for(name))
    }
}

/// Leaves paths untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOptimizer;

impl PathOptimizer for IdentityOptimizer {
    fn optimize(&self, path: &str) -> String {
        path.to_string()
    }
}
