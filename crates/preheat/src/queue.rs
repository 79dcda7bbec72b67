//! # Warm Job Queue
//!
//! Contract for handing warm requests to a background queue instead of
//! fetching them inline. The engine only dispatches; executing jobs is
//! the backend's business.

use thiserror::Error;

use crate::client::ClientSettings;
use crate::request::WarmRequest;

/// Connection name whose jobs run inline in the dispatching process.
/// Queueing onto it would just be a slower immediate run.
pub const SYNC_CONNECTION: &str = "sync";

/// How a queued job should treat pages that are already cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Warm the page unconditionally.
    Always,
    /// Re-check the cache at execution time and skip fresh pages. Used
    /// for uncached-only runs, where the picture may change between
    /// dispatch and execution.
    IfUncached,
}

/// A warm request packaged for later execution.
///
/// Jobs carry their client settings so a deferred request replays with
/// the same identity the inline run would have used.
#[derive(Debug, Clone)]
pub struct WarmJob {
    pub request: WarmRequest,
    pub client: ClientSettings,
    pub kind: JobKind,
    /// Named queue this job should land on, or the connection's default.
    pub queue: Option<String>,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("connection {connection:?} refused warm job: {reason}")]
    Rejected { connection: String, reason: String },
}

/// A queue backend able to accept warm jobs.
pub trait JobQueue: Send + Sync {
    /// Connection name jobs are dispatched on.
    fn connection(&self) -> &str;

    /// Default named queue for warm jobs, when the backend has one.
    fn queue(&self) -> Option<&str> {
        None
    }

    /// Accepts a job for later execution.
    fn enqueue(&self, job: WarmJob) -> Result<(), QueueError>;
}
