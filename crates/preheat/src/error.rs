//! # Error Types
//!
//! Error type for cache warming operations.

use thiserror::Error;

use crate::queue::QueueError;

/// Errors that abort a warm run before or during planning.
///
/// Per-page fetch failures are not errors; they are reported as
/// [`crate::request::WarmOutcome`] values so one bad page never stops
/// the rest of the run.
#[derive(Debug, Error)]
pub enum WarmError {
    /// Static caching is switched off, so there is nothing to warm.
    #[error("static caching is disabled")]
    CachingDisabled,

    /// The configured strategy name has no matching strategy table.
    #[error("static caching strategy {0:?} is not configured")]
    UnknownStrategy(String),

    /// The active strategy uses a driver the warmer cannot pre-render for.
    #[error("strategy {strategy:?} uses the {driver:?} driver, which does not store pages on disk")]
    UnsupportedDriver { strategy: String, driver: String },

    /// A URL source produced a value that does not parse as a URL.
    #[error("source {label:?} produced invalid URL {url:?}: {source}")]
    InvalidUrl {
        label: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be built from the requested settings.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The job queue refused a warm job.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Filesystem failure while probing or preparing the cache.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}
