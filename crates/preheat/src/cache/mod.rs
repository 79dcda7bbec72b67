//! # Static Page Cache
//!
//! Cache lookups and writes for fully rendered pages, plus the factory
//! mapping the configured strategy onto a concrete cacher.

pub mod buster;
pub mod file;
pub mod store;
pub mod writer;

pub use buster::CacheBuster;
pub use file::FileCacher;
pub use store::PageCache;
pub use writer::CacheWriter;

use std::path::Path;

use crate::config::{CacheDriver, StaticCacheConfig};
use crate::error::WarmError;

/// Builds the cacher for the active strategy.
///
/// Only the `file` driver stores pages the warmer can pre-render, so
/// every other driver is rejected with an error naming it. A `root`
/// override relocates the cache for one run, which lets a deploy warm
/// into a staging directory and swap it in afterwards.
pub fn cacher_from_config(
    config: &StaticCacheConfig,
    root: Option<&Path>,
) -> Result<CacheBuster<FileCacher>, WarmError> {
    let (name, strategy) = config.active_strategy()?;

    match strategy.driver {
        CacheDriver::File => {
            let root = root.unwrap_or(&strategy.path);
            Ok(CacheBuster::new(FileCacher::new(
                root,
                strategy.permissions,
                strategy.lock_hold(),
                strategy.expiry(),
            )))
        }
        driver => Err(WarmError::UnsupportedDriver {
            strategy: name.to_string(),
            driver: driver.to_string(),
        }),
    }
}
