//! # Warm Events
//!
//! Progress notifications emitted while a warm run executes. Callers
//! register a single callback and render the events however they like;
//! the engine never prints.

use std::sync::Arc;

use crate::request::WarmOutcome;

/// Events reported during planning and warming.
#[derive(Debug, Clone)]
pub enum WarmEvent {
    /// A URL source is about to be collected.
    SourceStarted { label: String },

    /// A URL source finished, contributing `urls` candidates.
    SourceCompleted { label: String, urls: usize },

    /// Planning finished with this many requests to execute.
    PlanReady { requests: usize },

    /// Queueing was requested but is impossible, so the run continues
    /// inline. The reason says why.
    QueueDowngraded { reason: String },

    /// One page finished warming, successfully or not.
    PageWarmed { outcome: WarmOutcome },

    /// All requests were handed to the queue backend.
    Enqueued {
        jobs: usize,
        connection: String,
        queue: Option<String>,
    },
}

/// Callback for warm events.
pub type OnEvent = Arc<dyn Fn(WarmEvent) + Send + Sync>;

/// Callback that drops every event.
pub fn noop() -> OnEvent {
    Arc::new(|_| {})
}
