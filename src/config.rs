//! Configuration for the node tree tooling
//!
//! Settings are layered with the `config` crate: built-in defaults, the global
//! `$XDG_CONFIG_HOME/nodetree/config.toml`, an explicit file, then `NODETREE__*`
//! environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default name of the folder that holds per-archive meta roots
pub const DEFAULT_PACKAGES_FOLDER: &str = "Packages";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeTreeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl NodeTreeConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.build.validate()
    }
}

/// Settings for the multi-archive builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Name of the top-level meta folder
    #[serde(default = "default_packages_folder")]
    pub packages_folder: String,

    /// Consume archives on worker threads
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_packages_folder() -> String {
    DEFAULT_PACKAGES_FOLDER.to_string()
}

fn default_parallel() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            packages_folder: default_packages_folder(),
            parallel: default_parallel(),
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        let name = self.packages_folder.as_str();
        if name.is_empty() || name.contains(|c| c == '/' || c == '\\' || c == '\0') {
            return Err(ApiError::ConfigError(format!(
                "Invalid packages folder name {:?}",
                name
            )));
        }
        Ok(())
    }
}

/// Extension overrides for the default classifier.
///
/// Keys are lower-case extensions without the dot; values are content kind bits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub extensions: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeTreeConfig::default();
        assert_eq!(config.build.packages_folder, "Packages");
        assert!(config.build.parallel);
        assert!(config.classifier.extensions.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_packages_folder() {
        for name in ["", "a/b", "a\\b", "nul\0"] {
            let build = BuildConfig {
                packages_folder: name.to_string(),
                parallel: false,
            };
            assert!(build.validate().is_err(), "{:?} should be rejected", name);
        }
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: NodeTreeConfig = toml::from_str(
            "[build]\nparallel = false\n\n[classifier.extensions]\nbin = 16\n",
        )
        .unwrap();
        assert_eq!(config.build.packages_folder, "Packages");
        assert!(!config.build.parallel);
        assert_eq!(config.classifier.extensions.get("bin"), Some(&16));
    }
}
