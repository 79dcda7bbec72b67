//! # Warm Orchestrator
//!
//! End-to-end warm run: validate the caching configuration, plan the
//! requests, then either fetch them inline or hand them to the queue.
//! All policy lives here; the collaborators below it stay mechanism.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::cacher_from_config;
use crate::client::ClientSettings;
use crate::config::StaticCacheConfig;
use crate::error::WarmError;
use crate::events::{self, OnEvent, WarmEvent};
use crate::planner::{RequestPlanner, WarmFilter};
use crate::queue::{JobKind, JobQueue, SYNC_CONNECTION};
use crate::request::WarmOutcome;
use crate::scheduler::WarmScheduler;
use crate::sources::SourceSet;

/// Options for one warm run, mapped from the command surface.
#[derive(Debug, Clone, Default)]
pub struct WarmOptions {
    /// Hand requests to the job queue instead of fetching inline.
    pub queue: bool,

    /// Basic-auth user, paired with `password`.
    pub user: Option<String>,

    /// Basic-auth password. Ignored without a user.
    pub password: Option<String>,

    /// Skip TLS certificate verification.
    pub insecure: bool,

    /// Planning filters.
    pub filter: WarmFilter,

    /// Warm into this directory instead of the configured cache root.
    pub temp_dir: Option<PathBuf>,
}

/// What a completed run did.
#[derive(Debug)]
pub enum WarmSummary {
    /// Requests were accepted by the queue for later execution.
    Queued {
        jobs: usize,
        connection: String,
        queue: Option<String>,
    },
    /// Every request resolved inline.
    Warmed { outcomes: Vec<WarmOutcome> },
}

impl WarmSummary {
    /// Outcomes that did not produce a cached page. Empty for queued
    /// runs, whose results are not known yet.
    pub fn failures(&self) -> Vec<&WarmOutcome> {
        match self {
            Self::Queued { .. } => Vec::new(),
            Self::Warmed { outcomes } => outcomes
                .iter()
                .filter(|outcome| !outcome.status.is_success())
                .collect(),
        }
    }
}

enum RunMode {
    Immediate,
    Deferred(Arc<dyn JobQueue>),
}

/// Drives a complete warm run.
pub struct Warmer {
    config: StaticCacheConfig,
    sources: SourceSet,
    queue: Option<Arc<dyn JobQueue>>,
    on_event: OnEvent,
}

impl Warmer {
    pub fn new(config: StaticCacheConfig, sources: SourceSet) -> Self {
        Self {
            config,
            sources,
            queue: None,
            on_event: events::noop(),
        }
    }

    /// Wires a queue backend for deferred runs.
    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Registers the progress callback.
    pub fn with_events(mut self, on_event: OnEvent) -> Self {
        self.on_event = on_event;
        self
    }

    /// Extra URL sources and hooks can be registered until the run starts.
    pub fn sources_mut(&mut self) -> &mut SourceSet {
        &mut self.sources
    }

    /// Runs the warmer once.
    ///
    /// Fails fast when caching is disabled, the strategy is unknown, or
    /// its driver has no disk cache to warm. An unusable queue is not
    /// fatal; the run downgrades to immediate mode and says so.
    pub async fn run(&self, options: &WarmOptions) -> Result<WarmSummary, WarmError> {
        let (strategy_name, strategy) = self.config.active_strategy()?;
        let cacher = cacher_from_config(&self.config, options.temp_dir.as_deref())?;
        info!(strategy = strategy_name, "warming static cache");

        let mode = self.resolve_mode(options);
        let scheduler = WarmScheduler::new(
            self.client_settings(options),
            strategy.warm_concurrency,
        )?;

        let planner = RequestPlanner::new(self.config.base_url.clone());
        let requests = planner
            .plan(&self.sources, &options.filter, &cacher, &self.on_event)
            .await?;

        match mode {
            RunMode::Deferred(queue) => {
                let kind = if options.filter.uncached_only {
                    JobKind::IfUncached
                } else {
                    JobKind::Always
                };
                let lane = self
                    .config
                    .queue
                    .warm_queue
                    .clone()
                    .or_else(|| queue.queue().map(String::from));
                let jobs = scheduler.enqueue(
                    &requests,
                    kind,
                    lane.as_deref(),
                    queue.as_ref(),
                    &self.on_event,
                )?;
                Ok(WarmSummary::Queued {
                    jobs,
                    connection: queue.connection().to_string(),
                    queue: lane,
                })
            }
            RunMode::Immediate => {
                let outcomes = scheduler
                    .warm(&requests, &self.config.base_url, &self.on_event)
                    .await;
                Ok(WarmSummary::Warmed { outcomes })
            }
        }
    }

    /// Queueing needs a wired backend on an asynchronous connection;
    /// anything else falls back to warming inline.
    fn resolve_mode(&self, options: &WarmOptions) -> RunMode {
        if !options.queue {
            return RunMode::Immediate;
        }

        let connection = self.config.queue.connection();
        if connection.is_none_or(|name| name == SYNC_CONNECTION) {
            let reason = match connection {
                Some(name) => format!("queue connection {name:?} runs jobs synchronously"),
                None => "no queue connection is configured".to_string(),
            };
            warn!(%reason, "warming immediately instead");
            (self.on_event)(WarmEvent::QueueDowngraded { reason });
            return RunMode::Immediate;
        }

        match &self.queue {
            Some(queue) => RunMode::Deferred(Arc::clone(queue)),
            None => {
                let reason = "no queue backend is wired".to_string();
                warn!(%reason, "warming immediately instead");
                (self.on_event)(WarmEvent::QueueDowngraded { reason });
                RunMode::Immediate
            }
        }
    }

    /// TLS verification is skipped for local or testing environments and
    /// when the run says so; credentials only apply as a complete pair.
    fn client_settings(&self, options: &WarmOptions) -> ClientSettings {
        let relaxed = matches!(self.config.environment.as_str(), "local" | "testing");
        let auth = options
            .user
            .as_ref()
            .zip(options.password.as_ref())
            .map(|(user, password)| (user.clone(), password.clone()));

        ClientSettings {
            verify: !options.insecure && !relaxed,
            auth,
            ..ClientSettings::default()
        }
    }
}
