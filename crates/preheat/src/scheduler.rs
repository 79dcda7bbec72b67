//! # Warm Scheduler
//!
//! Executes a plan. Immediate mode replays the requests through a
//! bounded pool of concurrent fetches; deferred mode hands them to a
//! job queue untouched. Either way the plan itself is already final,
//! so the scheduler never filters or reorders work.

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use crate::client::{create_client, ClientSettings};
use crate::error::WarmError;
use crate::events::{OnEvent, WarmEvent};
use crate::queue::{JobKind, JobQueue, WarmJob};
use crate::request::{relative_uri, WarmOutcome, WarmRequest, WarmStatus};

/// Characters of a 500 response body quoted in the failure message.
const BODY_SUMMARY_LIMIT: usize = 500;

/// Replays planned requests against the site.
pub struct WarmScheduler {
    client: Client,
    settings: ClientSettings,
    concurrency: usize,
}

impl WarmScheduler {
    /// Builds a scheduler fetching at most `concurrency` pages at once.
    /// A concurrency of zero is treated as one.
    pub fn new(settings: ClientSettings, concurrency: usize) -> Result<Self, WarmError> {
        let client = create_client(&settings)?;
        Ok(Self {
            client,
            settings,
            concurrency: concurrency.max(1),
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches every request, keeping at most `concurrency` in flight.
    ///
    /// Every request produces exactly one outcome keyed by its plan
    /// position; a page that fails never stops the rest of the run.
    /// `PageWarmed` events fire in completion order, while the returned
    /// outcomes are sorted back into plan order.
    pub async fn warm(
        &self,
        requests: &[WarmRequest],
        base_url: &str,
        on_event: &OnEvent,
    ) -> Vec<WarmOutcome> {
        let mut pending = requests.iter().enumerate();
        let mut in_flight = FuturesUnordered::new();

        for (index, request) in pending.by_ref().take(self.concurrency) {
            in_flight.push(self.fetch(index, request, base_url));
        }

        let mut outcomes = Vec::with_capacity(requests.len());
        while let Some(outcome) = in_flight.next().await {
            if let Some((index, request)) = pending.next() {
                in_flight.push(self.fetch(index, request, base_url));
            }
            on_event(WarmEvent::PageWarmed {
                outcome: outcome.clone(),
            });
            outcomes.push(outcome);
        }

        outcomes.sort_unstable_by_key(|outcome| outcome.index);
        outcomes
    }

    /// Hands every request to the queue backend instead of fetching.
    ///
    /// Jobs inherit this scheduler's client settings, so deferred
    /// requests replay with the identity the inline run would have
    /// used, and land on `lane` when one is given.
    pub fn enqueue(
        &self,
        requests: &[WarmRequest],
        kind: JobKind,
        lane: Option<&str>,
        queue: &dyn JobQueue,
        on_event: &OnEvent,
    ) -> Result<usize, WarmError> {
        for request in requests {
            queue.enqueue(WarmJob {
                request: request.clone(),
                client: self.settings.clone(),
                kind,
                queue: lane.map(String::from),
            })?;
        }

        on_event(WarmEvent::Enqueued {
            jobs: requests.len(),
            connection: queue.connection().to_string(),
            queue: lane.map(String::from),
        });

        Ok(requests.len())
    }

    async fn fetch(&self, index: usize, request: &WarmRequest, base_url: &str) -> WarmOutcome {
        let uri = relative_uri(request.url(), base_url);
        debug!(%uri, "warming page");

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some((user, password)) = &self.settings.auth {
            builder = builder.basic_auth(user, Some(password));
        }

        let status = match builder.send().await {
            Ok(response) => classify_response(response).await,
            Err(error) => WarmStatus::Failure {
                code: error.status().map(|status| status.as_u16()),
                message: error.to_string(),
            },
        };

        WarmOutcome { index, uri, status }
    }
}

async fn classify_response(response: Response) -> WarmStatus {
    let status = response.status();
    if status.is_success() {
        return WarmStatus::Success(status.as_u16());
    }

    let mut message = status_line(status);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        let summary = body_summary(response, BODY_SUMMARY_LIMIT).await;
        if !summary.is_empty() {
            message.push('\n');
            message.push_str(&summary);
        }
    }

    WarmStatus::Failure {
        code: Some(status.as_u16()),
        message,
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

/// First `limit` characters of the response body, marked when cut.
async fn body_summary(response: Response, limit: usize) -> String {
    let Ok(body) = response.text().await else {
        return String::new();
    };
    if body.chars().count() <= limit {
        return body;
    }
    let mut summary: String = body.chars().take(limit).collect();
    summary.push_str(" (truncated...)");
    summary
}
