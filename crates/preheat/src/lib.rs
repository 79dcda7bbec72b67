//! # Preheat Engine
//!
//! Warms a static page cache by replaying every URL a site serves.
//! Content collaborators contribute candidate URLs, the planner turns
//! them into an ordered plan, and the scheduler fetches the plan
//! through a bounded pool of concurrent requests carrying the
//! cache-buster header, so each page is rendered fresh and its cached
//! copy rewritten.
//!
//! ## Features
//!
//! - **Planning**: deduplicated, filtered, sorted request plans from
//!   entries, taxonomies, terms, custom routes, and registered hooks
//! - **Immediate warming**: bounded-concurrency fetching where one slow
//!   or broken page never stops the rest
//! - **Deferred warming**: hand the plan to a queue backend instead
//! - **File cache primitives**: advisory-locked page writes and
//!   cache-buster aware lookups for the site side of the contract
//!
//! The engine reports progress through [`events::WarmEvent`] callbacks
//! and never prints on its own.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod planner;
pub mod queue;
pub mod request;
pub mod scheduler;
pub mod sources;
pub mod test_utils;

pub use cache::{cacher_from_config, CacheBuster, CacheWriter, FileCacher, PageCache};
pub use client::{create_client, ClientSettings};
pub use config::{
    CacheDriver, CachePermissions, QueueConfig, StaticCacheConfig, StrategyConfig,
    DEFAULT_WARM_CONCURRENCY,
};
pub use error::WarmError;
pub use events::{OnEvent, WarmEvent};
pub use orchestrator::{WarmOptions, WarmSummary, Warmer};
pub use planner::{RequestPlanner, WarmFilter};
pub use queue::{JobKind, JobQueue, QueueError, WarmJob, SYNC_CONNECTION};
pub use request::{
    relative_uri, WarmOutcome, WarmRequest, WarmStatus, CACHE_BUSTER_HEADER,
};
pub use scheduler::WarmScheduler;
pub use sources::{
    CustomRoute, Entry, EntrySource, RouteSource, SourceSet, Taxonomy, TaxonomySource, Term,
    TermSource, UrlHook, UrlSource,
};
