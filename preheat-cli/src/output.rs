//! # Console Output
//!
//! Renders warm events as console lines. The engine reports progress
//! through its event callback; everything printed lives here.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use preheat_engine::{WarmEvent, WarmOutcome, WarmStatus, WarmSummary};

/// Terminal renderer for warm progress.
pub struct Reporter {
    /// Whether the run still intends to queue. Cleared when the engine
    /// downgrades to an immediate run.
    queueing: AtomicBool,
}

impl Reporter {
    pub fn new(queueing: bool) -> Self {
        Self {
            queueing: AtomicBool::new(queueing),
        }
    }

    pub fn handle(&self, event: &WarmEvent) {
        match event {
            WarmEvent::SourceStarted { label } => {
                println!("[ ] {label}...");
            }
            WarmEvent::SourceCompleted { label, urls } => {
                println!("{} {label} ({urls} URLs)", "[✔]".green());
            }
            WarmEvent::QueueDowngraded { reason } => {
                self.queueing.store(false, Ordering::SeqCst);
                println!(
                    "{} {reason}; warming immediately instead.",
                    "Warning:".yellow().bold()
                );
            }
            WarmEvent::PlanReady { requests } => {
                if self.queueing.load(Ordering::SeqCst) {
                    println!("Adding {requests} requests onto the queue...");
                } else {
                    println!("Visiting {requests} URLs...");
                }
            }
            WarmEvent::PageWarmed { outcome } => self.page_line(outcome),
            WarmEvent::Enqueued {
                jobs,
                connection,
                queue,
            } => match queue {
                Some(queue) => {
                    println!("Dispatched {jobs} jobs onto the {queue} queue ({connection}).");
                }
                None => println!("Dispatched {jobs} jobs via the {connection} connection."),
            },
        }
    }

    fn page_line(&self, outcome: &WarmOutcome) {
        match &outcome.status {
            WarmStatus::Success(_) => {
                println!("  {} {}", outcome.uri, "✓ Cached".green());
            }
            WarmStatus::Failure { message, .. } => {
                let mut lines = message.lines();
                let first = lines.next().unwrap_or("request failed");
                println!("  {} {}", outcome.uri, first.red());
                for line in lines {
                    println!("      {}", line.dimmed());
                }
            }
        }
    }

    /// Closing line once the run finished.
    pub fn summarize(&self, summary: &WarmSummary) {
        match summary {
            WarmSummary::Queued { .. } => {
                println!(
                    "{}",
                    "All requests to warm the static cache have been added to the queue.".green()
                );
            }
            WarmSummary::Warmed { outcomes } => {
                let failures = summary.failures().len();
                if failures > 0 {
                    let note = format!("{failures} of {} pages failed to warm.", outcomes.len());
                    println!("{}", note.yellow());
                }
                println!("{}", "The static cache has been warmed.".green());
            }
        }
    }
}
