//! # Static Cache Configuration
//!
//! Configuration model for the warmer: which caching strategy is active,
//! where cached pages live on disk, and how warm jobs are queued.
//!
//! The structures deserialize from the host application's configuration
//! (TOML in the bundled CLI) and carry defaults matching a stock install.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::WarmError;

/// Requests fetched in parallel when a strategy does not say otherwise.
pub const DEFAULT_WARM_CONCURRENCY: usize = 25;

fn default_environment() -> String {
    "production".to_string()
}

fn default_warm_concurrency() -> usize {
    DEFAULT_WARM_CONCURRENCY
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("static")
}

fn default_dir_mode() -> u32 {
    0o755
}

fn default_file_mode() -> u32 {
    0o644
}

/// Top-level static caching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticCacheConfig {
    /// Absolute URL the site is served from, e.g. `http://localhost`.
    pub base_url: String,

    /// Application environment name. TLS verification is relaxed for
    /// `local` and `testing`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Name of the active strategy, or `None` when caching is disabled.
    #[serde(default)]
    pub strategy: Option<String>,

    /// Strategy tables keyed by name.
    #[serde(default)]
    pub strategies: HashMap<String, StrategyConfig>,

    /// Queue wiring for deferred warming.
    #[serde(default)]
    pub queue: QueueConfig,
}

impl StaticCacheConfig {
    /// Resolves the active strategy, or the configuration problem that
    /// prevents a warm run.
    ///
    /// An unset or empty strategy name means caching is disabled.
    pub fn active_strategy(&self) -> Result<(&str, &StrategyConfig), WarmError> {
        let name = self
            .strategy
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(WarmError::CachingDisabled)?;

        let strategy = self
            .strategies
            .get(name)
            .ok_or_else(|| WarmError::UnknownStrategy(name.to_string()))?;

        Ok((name, strategy))
    }
}

/// How cached pages are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDriver {
    /// Full HTML pages written to disk, served without hitting the app.
    File,
    /// Half measure: responses cached in the application cache. There is
    /// nothing on disk to swap, so the warmer rejects it.
    Application,
    /// No caching at all.
    Null,
}

impl std::fmt::Display for CacheDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Application => write!(f, "application"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// One named caching strategy.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub driver: CacheDriver,

    /// Root directory cached pages are written under.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Parallel requests used when warming this strategy.
    #[serde(default = "default_warm_concurrency")]
    pub warm_concurrency: usize,

    /// Seconds the page lock is held after a write. Zero releases the
    /// lock as soon as the write finishes.
    #[serde(default)]
    pub lock_hold_seconds: u64,

    /// Minutes before a cached page counts as stale. `None` caches
    /// forever.
    #[serde(default)]
    pub expiry_minutes: Option<u64>,

    /// Unix permissions applied to cache files and directories.
    #[serde(default)]
    pub permissions: CachePermissions,
}

impl StrategyConfig {
    pub fn lock_hold(&self) -> Duration {
        Duration::from_secs(self.lock_hold_seconds)
    }

    pub fn expiry(&self) -> Option<Duration> {
        self.expiry_minutes
            .map(|minutes| Duration::from_secs(minutes * 60))
    }
}

/// Unix modes for files and directories the cache creates.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CachePermissions {
    #[serde(default = "default_dir_mode")]
    pub dir: u32,
    #[serde(default = "default_file_mode")]
    pub file: u32,
}

impl Default for CachePermissions {
    fn default() -> Self {
        Self {
            dir: default_dir_mode(),
            file: default_file_mode(),
        }
    }
}

/// Queue connection used when warm requests are deferred.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueConfig {
    /// Application-wide default connection name.
    #[serde(default)]
    pub default: Option<String>,

    /// Connection override for warm jobs specifically.
    #[serde(default)]
    pub warm_connection: Option<String>,

    /// Named queue warm jobs are dispatched onto.
    #[serde(default)]
    pub warm_queue: Option<String>,
}

impl QueueConfig {
    /// Connection name warm jobs would run on, when any is configured.
    pub fn connection(&self) -> Option<&str> {
        self.warm_connection.as_deref().or(self.default.as_deref())
    }
}
