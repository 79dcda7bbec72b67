//! # Program Configuration
//!
//! TOML configuration file: the engine's static-cache settings plus the
//! content the CLI can discover without a CMS behind it. Richer content
//! sources plug in through the library API instead.

use std::path::Path;

use serde::Deserialize;

use preheat_engine::StaticCacheConfig;

use crate::error::{AppError, Result};

/// Whole-program configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    #[serde(flatten)]
    pub cache: StaticCacheConfig,

    #[serde(default)]
    pub content: ContentConfig,
}

/// Statically known content, straight from the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
    /// Site-relative route URIs to warm. Routes with `{placeholder}`
    /// segments are skipped.
    #[serde(default)]
    pub routes: Vec<String>,

    /// Extra URLs to warm, absolute or site-relative.
    #[serde(default)]
    pub urls: Vec<String>,
}

impl ProgramConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|error| AppError::Config(format!("cannot read {}: {error}", path.display())))?;

        toml::from_str(&raw)
            .map_err(|error| AppError::Config(format!("cannot parse {}: {error}", path.display())))
    }
}
