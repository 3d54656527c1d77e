//! In-memory archive backed by a path list

use super::{Archive, FileInfo};
use crate::error::TreeError;
use std::collections::HashMap;
use std::path::Path;

/// An archive whose contents are an explicit list of paths.
///
/// Text listings hold one path per line. A leading `-` marks the entry as deleted, a
/// leading `?` as missing; blank lines and lines starting with `#` are skipped.
#[derive(Debug, Clone, Default)]
pub struct ListArchive {
    paths: Vec<String>,
    info: HashMap<String, FileInfo>,
}

impl ListArchive {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            info: HashMap::new(),
        }
    }

    /// Add a path with explicit existence flags
    pub fn with_entry(mut self, path: impl Into<String>, info: FileInfo) -> Self {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path.clone());
        }
        self.info.insert(path, info);
        self
    }

    pub fn parse(listing: &str) -> Self {
        let mut archive = Self::default();
        for line in listing.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (path, info) = if let Some(path) = line.strip_prefix('-') {
                (
                    path.trim(),
                    FileInfo {
                        exists: true,
                        deleted: true,
                    },
                )
            } else if let Some(path) = line.strip_prefix('?') {
                (
                    path.trim(),
                    FileInfo {
                        exists: false,
                        deleted: false,
                    },
                )
            } else {
                (line, FileInfo::PRESENT)
            };
            archive.paths.push(path.to_string());
            if info != FileInfo::PRESENT {
                archive.info.insert(path.to_string(), info);
            }
        }
        archive
    }

    pub fn from_file(path: &Path) -> Result<Self, TreeError> {
        let listing = std::fs::read_to_string(path).map_err(|e| TreeError::Archive {
            archive: path.display().to_string(),
            message: format!("Failed to read listing: {}", e),
        })?;
        Ok(Self::parse(&listing))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Archive for ListArchive {
    fn has_file_list(&self) -> bool {
        true
    }

    fn file_list(&self) -> Result<Vec<String>, TreeError> {
        Ok(self.paths.clone())
    }

    fn file_info(&self, path: &str) -> Result<FileInfo, TreeError> {
        Ok(self.info.get(path).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_markers() {
        let archive = ListArchive::parse(
            "# listing\n\
             data\\a.txt\n\
             \n\
             -data\\old.txt\n\
             ?data\\gone.txt\n",
        );
        assert_eq!(
            archive.file_list().unwrap(),
            vec!["data\\a.txt", "data\\old.txt", "data\\gone.txt"]
        );
        assert_eq!(archive.file_info("data\\a.txt").unwrap(), FileInfo::PRESENT);
        assert!(archive.file_info("data\\old.txt").unwrap().deleted);
        assert!(!archive.file_info("data\\gone.txt").unwrap().exists);
    }

    #[test]
    fn test_unknown_paths_default_to_present() {
        let archive = ListArchive::new(["x.txt"]);
        assert_eq!(archive.file_info("other").unwrap(), FileInfo::PRESENT);
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_with_entry_does_not_duplicate() {
        let archive = ListArchive::new(["x.txt"]).with_entry(
            "x.txt",
            FileInfo {
                exists: true,
                deleted: true,
            },
        );
        assert_eq!(archive.len(), 1);
        assert!(archive.file_info("x.txt").unwrap().deleted);
    }
}
