//! Defaults seeded into every builder before any source is layered on.

use crate::config::DEFAULT_PACKAGES_FOLDER;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("build.packages_folder", DEFAULT_PACKAGES_FOLDER)?
        .set_default("build.parallel", true)
}
