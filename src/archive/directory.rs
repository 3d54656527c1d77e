//! Archive view over a directory on disk

use super::{Archive, FileInfo};
use crate::error::TreeError;
use crate::types::PATH_SEPARATOR;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Treats every regular file below `root` as an archive entry
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn open(root: &Path) -> Result<Self, TreeError> {
        let root = dunce::canonicalize(root).map_err(|e| TreeError::Archive {
            archive: root.display().to_string(),
            message: format!("Failed to open directory: {}", e),
        })?;
        if !root.is_dir() {
            return Err(TreeError::Archive {
                archive: root.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn archive_error(&self, message: String) -> TreeError {
        TreeError::Archive {
            archive: self.root.display().to_string(),
            message,
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for component in crate::types::split_path(path) {
            full.push(component);
        }
        full
    }
}

impl Archive for DirectoryArchive {
    fn has_file_list(&self) -> bool {
        self.root.is_dir()
    }

    fn file_list(&self) -> Result<Vec<String>, TreeError> {
        let separator = PATH_SEPARATOR.to_string();
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| self.archive_error(format!("Walk failed: {}", e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| self.archive_error(format!("Unexpected entry path: {}", e)))?;
            let components: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            paths.push(components.join(separator.as_str()));
        }
        Ok(paths)
    }

    fn file_info(&self, path: &str) -> Result<FileInfo, TreeError> {
        Ok(FileInfo {
            exists: self.resolve(path).exists(),
            deleted: false,
        })
    }
}
