//! # Request Planner
//!
//! Turns the pool of candidate URLs into the ordered, deduplicated list
//! of requests a warm run will execute. Filtering happens here, before
//! any HTTP leaves the machine, so `--max-requests` style limits apply
//! to the final plan rather than the raw pool.

use std::collections::HashSet;

use url::Url;

use crate::cache::PageCache;
use crate::error::WarmError;
use crate::events::{OnEvent, WarmEvent};
use crate::request::{relative_uri, WarmRequest};
use crate::sources::SourceSet;

/// Filters applied to one planning run.
#[derive(Debug, Clone, Default)]
pub struct WarmFilter {
    /// Only URIs matching one of these patterns are planned.
    pub include: Vec<String>,
    /// URIs matching one of these patterns are dropped.
    pub exclude: Vec<String>,
    /// Maximum number of path segments a URI may have.
    pub max_depth: Option<usize>,
    /// Skip pages that already have a fresh cache entry.
    pub uncached_only: bool,
    /// Hard cap on the number of planned requests.
    pub max_requests: Option<usize>,
}

impl WarmFilter {
    /// Splits a comma-separated pattern list, dropping empty pieces.
    pub fn parse_patterns(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Plans warm requests from a [`SourceSet`].
pub struct RequestPlanner {
    base_url: String,
}

impl RequestPlanner {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Computes the plan: collect, deduplicate, filter, sort, cap.
    ///
    /// The cacher is only consulted when `uncached_only` is set, and the
    /// probes go out without the cache-buster header so they see the
    /// cache exactly as a visitor would.
    pub async fn plan(
        &self,
        sources: &SourceSet,
        filter: &WarmFilter,
        cacher: &dyn PageCache,
        on_event: &OnEvent,
    ) -> Result<Vec<WarmRequest>, WarmError> {
        let candidates = sources.collect(on_event)?;

        let mut seen = HashSet::new();
        let mut urls: Vec<Url> = candidates
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();

        if !filter.include.is_empty() {
            urls.retain(|url| {
                let path = self.match_path(url);
                filter.include.iter().any(|pattern| uri_matches(&path, pattern))
            });
        }

        if !filter.exclude.is_empty() {
            urls.retain(|url| {
                let path = self.match_path(url);
                !filter.exclude.iter().any(|pattern| uri_matches(&path, pattern))
            });
        }

        if let Some(max_depth) = filter.max_depth {
            urls.retain(|url| !exceeds_depth(&self.match_path(url), max_depth));
        }

        if filter.uncached_only {
            let mut uncached = Vec::with_capacity(urls.len());
            for url in urls {
                let probe = WarmRequest::bare(url.clone());
                if !cacher.has_cached_page(&probe).await? {
                    uncached.push(url);
                }
            }
            urls = uncached;
        }

        urls.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));
        if let Some(max_requests) = filter.max_requests {
            urls.truncate(max_requests);
        }

        let requests: Vec<WarmRequest> = urls.into_iter().map(WarmRequest::busting).collect();
        on_event(WarmEvent::PlanReady {
            requests: requests.len(),
        });

        Ok(requests)
    }

    /// Site-relative path used for pattern and depth checks, without the
    /// query string.
    fn match_path(&self, url: &Url) -> String {
        let uri = relative_uri(url, &self.base_url);
        match uri.find('?') {
            Some(position) => uri[..position].to_string(),
            None => uri,
        }
    }
}

/// Whether `uri` matches `pattern`.
///
/// A pattern ending in `*` matches by prefix, except that a prefix
/// ending in `/` does not match the URI equal to itself, so `/blog/*`
/// matches `/blog/post-1` but neither `/blog` nor `/blog/`. Any other
/// pattern must match exactly, ignoring trailing slashes on both sides.
fn uri_matches(uri: &str, pattern: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        if uri.starts_with(prefix) && !(prefix.ends_with('/') && uri == prefix) {
            return true;
        }
    }
    uri.trim_end_matches('/') == pattern.trim_end_matches('/')
}

/// Whether `path` has more segments than `max_depth` allows. The site
/// root counts as one segment.
fn exceeds_depth(path: &str, max_depth: usize) -> bool {
    path.trim_matches('/').split('/').count() > max_depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PageCache;
    use crate::events;
    use crate::request::CACHE_BUSTER_HEADER;
    use crate::sources::{Entry, EntrySource};
    use async_trait::async_trait;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Cache fake with a fixed set of cached URLs.
    #[derive(Default)]
    struct FakeCache {
        cached: HashSet<String>,
        probe_carried_buster: AtomicBool,
    }

    #[async_trait]
    impl PageCache for FakeCache {
        async fn has_cached_page(&self, request: &WarmRequest) -> io::Result<bool> {
            if request.header(CACHE_BUSTER_HEADER).is_some() {
                self.probe_carried_buster.store(true, Ordering::SeqCst);
            }
            Ok(self.cached.contains(request.url().as_str()))
        }

        async fn cache_page(&self, _request: &WarmRequest, _content: &[u8]) -> io::Result<bool> {
            Ok(true)
        }
    }

    fn sources_of(urls: &[&str]) -> SourceSet {
        let entries = urls.iter().map(|url| Entry::new(*url)).collect();
        let mut sources = SourceSet::new("http://localhost");
        sources.add_source(EntrySource::new(entries));
        sources
    }

    async fn plan_with(sources: &SourceSet, filter: &WarmFilter) -> Vec<String> {
        let planner = RequestPlanner::new("http://localhost");
        planner
            .plan(sources, filter, &FakeCache::default(), &events::noop())
            .await
            .expect("plan")
            .iter()
            .map(|request| request.url().to_string())
            .collect()
    }

    #[test]
    fn wildcard_patterns_match_beneath_the_prefix_only() {
        assert!(uri_matches("/blog/post-1", "/blog/*"));
        assert!(uri_matches("/blog/2024/june", "/blog/*"));
        assert!(!uri_matches("/blog", "/blog/*"));
        assert!(!uri_matches("/blog/", "/blog/*"));
        assert!(!uri_matches("/about", "/blog/*"));
    }

    #[test]
    fn wildcard_without_slash_matches_the_prefix_itself() {
        assert!(uri_matches("/blog", "/blog*"));
        assert!(uri_matches("/blogging", "/blog*"));
        assert!(uri_matches("/blog/post", "/blog*"));
    }

    #[test]
    fn bare_star_matches_everything() {
        assert!(uri_matches("/", "*"));
        assert!(uri_matches("/anything/at/all", "*"));
    }

    #[test]
    fn exact_patterns_ignore_trailing_slashes() {
        assert!(uri_matches("/about", "/about"));
        assert!(uri_matches("/about/", "/about"));
        assert!(uri_matches("/about", "/about/"));
        assert!(!uri_matches("/about/team", "/about"));
    }

    #[test]
    fn depth_counts_path_segments() {
        assert!(!exceeds_depth("/", 1));
        assert!(!exceeds_depth("/blog", 1));
        assert!(!exceeds_depth("/blog/", 1));
        assert!(exceeds_depth("/blog/post-1", 1));
        assert!(!exceeds_depth("/blog/post-1", 2));
        assert!(exceeds_depth("/a/b/c", 2));
    }

    #[test]
    fn pattern_lists_split_on_commas() {
        assert_eq!(
            WarmFilter::parse_patterns("/blog/*, /about ,,"),
            vec!["/blog/*", "/about"]
        );
        assert!(WarmFilter::parse_patterns("").is_empty());
    }

    #[tokio::test]
    async fn plans_are_deduplicated_and_sorted() {
        let sources = sources_of(&[
            "http://localhost/c",
            "http://localhost/a",
            "http://localhost/b",
            "http://localhost/a",
        ]);

        let planned = plan_with(&sources, &WarmFilter::default()).await;

        assert_eq!(
            planned,
            vec![
                "http://localhost/a",
                "http://localhost/b",
                "http://localhost/c",
            ]
        );
    }

    #[tokio::test]
    async fn hidden_entries_and_duplicates_never_reach_the_plan() {
        let mut draft = Entry::new("http://localhost/draft");
        draft.published = false;
        let mut moved = Entry::new("http://localhost/moved");
        moved.redirect = true;

        let entries = vec![
            Entry::new("http://localhost/"),
            Entry::new("http://localhost/a"),
            Entry::new("http://localhost/b"),
            Entry::new("http://localhost/c"),
            Entry::new("http://localhost/a"),
            Entry::new("http://localhost/b"),
            draft,
            moved,
        ];
        let mut sources = SourceSet::new("http://localhost");
        sources.add_source(EntrySource::new(entries));

        let planned = plan_with(&sources, &WarmFilter::default()).await;

        assert_eq!(planned.len(), 4);
    }

    #[tokio::test]
    async fn include_and_exclude_apply_to_relative_uris() {
        let sources = sources_of(&[
            "http://localhost/blog/post-1",
            "http://localhost/blog/post-2",
            "http://localhost/blog",
            "http://localhost/about",
        ]);

        let filter = WarmFilter {
            include: vec!["/blog/*".to_string()],
            exclude: vec!["/blog/post-2".to_string()],
            ..Default::default()
        };

        assert_eq!(plan_with(&sources, &filter).await, vec!["http://localhost/blog/post-1"]);
    }

    #[tokio::test]
    async fn max_depth_drops_deep_pages() {
        let sources = sources_of(&[
            "http://localhost/",
            "http://localhost/blog",
            "http://localhost/blog/post-1",
        ]);

        let filter = WarmFilter {
            max_depth: Some(1),
            ..Default::default()
        };

        assert_eq!(
            plan_with(&sources, &filter).await,
            vec!["http://localhost/", "http://localhost/blog"]
        );
    }

    #[tokio::test]
    async fn max_requests_caps_the_sorted_plan() {
        let sources = sources_of(&[
            "http://localhost/c",
            "http://localhost/a",
            "http://localhost/b",
        ]);

        let filter = WarmFilter {
            max_requests: Some(2),
            ..Default::default()
        };

        assert_eq!(
            plan_with(&sources, &filter).await,
            vec!["http://localhost/a", "http://localhost/b"]
        );
    }

    #[tokio::test]
    async fn uncached_only_probes_without_the_buster_header() {
        let sources = sources_of(&["http://localhost/cached", "http://localhost/cold"]);
        let cache = FakeCache {
            cached: HashSet::from(["http://localhost/cached".to_string()]),
            ..Default::default()
        };

        let filter = WarmFilter {
            uncached_only: true,
            ..Default::default()
        };
        let planner = RequestPlanner::new("http://localhost");
        let planned = planner
            .plan(&sources, &filter, &cache, &events::noop())
            .await
            .expect("plan");

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].url().as_str(), "http://localhost/cold");
        assert!(!cache.probe_carried_buster.load(Ordering::SeqCst));
        assert_eq!(planned[0].header(CACHE_BUSTER_HEADER), Some("true"));
    }

    #[tokio::test]
    async fn plan_ready_reports_the_final_count() {
        let sources = sources_of(&["http://localhost/a", "http://localhost/b"]);
        let counts: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = Arc::clone(&counts);
        let on_event: crate::events::OnEvent = Arc::new(move |event| {
            if let WarmEvent::PlanReady { requests } = event {
                sink.lock().expect("lock").push(requests);
            }
        });

        let filter = WarmFilter {
            max_requests: Some(1),
            ..Default::default()
        };
        let planner = RequestPlanner::new("http://localhost");
        planner
            .plan(&sources, &filter, &FakeCache::default(), &on_event)
            .await
            .expect("plan");

        assert_eq!(*counts.lock().expect("lock"), vec![1]);
    }

    #[tokio::test]
    async fn empty_sources_produce_an_empty_plan() {
        let sources = SourceSet::new("http://localhost");

        assert!(plan_with(&sources, &WarmFilter::default()).await.is_empty());
    }
}
