//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::NodeTreeConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<NodeTreeConfig, ApiError> {
        let config = MergeService::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `path` layered over the global file.
    pub fn load_from_file(path: &Path) -> Result<NodeTreeConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the standard sources.
    pub fn resolve(path: Option<&Path>) -> Result<NodeTreeConfig, ApiError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }
}
