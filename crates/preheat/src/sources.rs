//! # URL Sources
//!
//! Where candidate URLs come from. Each source contributes the absolute
//! URLs of pages it knows about; the planner turns the combined pool
//! into an executable plan. Host applications register extra URLs
//! through hooks without implementing a full source.

use url::Url;

use crate::error::WarmError;
use crate::events::{OnEvent, WarmEvent};

/// A collaborator contributing candidate page URLs.
pub trait UrlSource: Send + Sync {
    /// Stage label shown while this source is collected.
    fn label(&self) -> &str;

    /// Absolute URLs this source wants warmed.
    fn urls(&self) -> Result<Vec<Url>, WarmError>;
}

/// Callback contributing extra URLs, absolute or site-relative.
pub type UrlHook = Box<dyn Fn() -> Vec<String> + Send + Sync>;

/// One content entry as the warmer sees it.
#[derive(Debug, Clone)]
pub struct Entry {
    pub absolute_url: String,
    pub published: bool,
    pub private: bool,
    pub redirect: bool,
}

impl Entry {
    /// A published, public entry at `absolute_url`.
    pub fn new(absolute_url: impl Into<String>) -> Self {
        Self {
            absolute_url: absolute_url.into(),
            published: true,
            private: false,
            redirect: false,
        }
    }
}

/// Entries that resolve to a real page: published, public, and not a
/// redirect.
pub struct EntrySource {
    entries: Vec<Entry>,
}

impl EntrySource {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl UrlSource for EntrySource {
    fn label(&self) -> &str {
        "Entries"
    }

    fn urls(&self) -> Result<Vec<Url>, WarmError> {
        self.entries
            .iter()
            .filter(|entry| entry.published && !entry.private && !entry.redirect)
            .map(|entry| parse_url(self.label(), &entry.absolute_url))
            .collect()
    }
}

/// A taxonomy rendered across one or more sites.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub handle: String,
    /// Whether a template exists to render this taxonomy at all.
    pub template_exists: bool,
    /// Absolute URL of the taxonomy index on each site.
    pub site_urls: Vec<String>,
}

pub struct TaxonomySource {
    taxonomies: Vec<Taxonomy>,
}

impl TaxonomySource {
    pub fn new(taxonomies: Vec<Taxonomy>) -> Self {
        Self { taxonomies }
    }
}

impl UrlSource for TaxonomySource {
    fn label(&self) -> &str {
        "Taxonomies"
    }

    fn urls(&self) -> Result<Vec<Url>, WarmError> {
        collect_site_urls(
            self.label(),
            self.taxonomies
                .iter()
                .filter(|taxonomy| taxonomy.template_exists)
                .flat_map(|taxonomy| taxonomy.site_urls.iter()),
        )
    }
}

/// A localized taxonomy term view, including collection-scoped ones.
#[derive(Debug, Clone)]
pub struct Term {
    pub template_exists: bool,
    pub site_urls: Vec<String>,
}

pub struct TermSource {
    terms: Vec<Term>,
}

impl TermSource {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }
}

impl UrlSource for TermSource {
    fn label(&self) -> &str {
        "Taxonomy terms"
    }

    fn urls(&self) -> Result<Vec<Url>, WarmError> {
        collect_site_urls(
            self.label(),
            self.terms
                .iter()
                .filter(|term| term.template_exists)
                .flat_map(|term| term.site_urls.iter()),
        )
    }
}

/// A statically defined route.
#[derive(Debug, Clone)]
pub struct CustomRoute {
    /// Site-relative URI, e.g. `/about`.
    pub uri: String,
    /// Routes with placeholder parameters cannot be warmed blindly.
    pub has_params: bool,
}

impl CustomRoute {
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let has_params = uri.contains('{');
        Self { uri, has_params }
    }
}

/// Parameterless custom routes, absolutized against the site base URL.
pub struct RouteSource {
    base_url: String,
    routes: Vec<CustomRoute>,
}

impl RouteSource {
    pub fn new(base_url: impl Into<String>, routes: Vec<CustomRoute>) -> Self {
        Self {
            base_url: base_url.into(),
            routes,
        }
    }
}

impl UrlSource for RouteSource {
    fn label(&self) -> &str {
        "Custom routes"
    }

    fn urls(&self) -> Result<Vec<Url>, WarmError> {
        self.routes
            .iter()
            .filter(|route| !route.has_params)
            .map(|route| parse_url(self.label(), &absolutize(&self.base_url, &route.uri)))
            .collect()
    }
}

/// Ordered set of sources plus registered additional-URL hooks.
#[derive(Default)]
pub struct SourceSet {
    base_url: String,
    sources: Vec<Box<dyn UrlSource>>,
    hooks: Vec<UrlHook>,
}

impl SourceSet {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sources: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: impl UrlSource + 'static) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn add_hook(&mut self, hook: impl Fn() -> Vec<String> + Send + Sync + 'static) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Collects every source in registration order, then the hooks.
    ///
    /// Emits a started/completed event pair per stage. The hook stage is
    /// always reported, even when no hooks are registered.
    pub(crate) fn collect(&self, on_event: &OnEvent) -> Result<Vec<Url>, WarmError> {
        let mut urls = Vec::new();

        for source in &self.sources {
            let label = source.label().to_string();
            on_event(WarmEvent::SourceStarted {
                label: label.clone(),
            });
            let batch = source.urls()?;
            on_event(WarmEvent::SourceCompleted {
                label,
                urls: batch.len(),
            });
            urls.extend(batch);
        }

        let label = "Additional URLs".to_string();
        on_event(WarmEvent::SourceStarted {
            label: label.clone(),
        });
        let mut extra = 0;
        for hook in &self.hooks {
            for raw in hook() {
                urls.push(parse_url(&label, &absolutize(&self.base_url, &raw))?);
                extra += 1;
            }
        }
        on_event(WarmEvent::SourceCompleted { label, urls: extra });

        Ok(urls)
    }
}

fn collect_site_urls<'a>(
    label: &str,
    urls: impl Iterator<Item = &'a String>,
) -> Result<Vec<Url>, WarmError> {
    urls.map(|raw| parse_url(label, raw)).collect()
}

fn absolutize(base_url: &str, uri: &str) -> String {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return uri.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        uri.trim_start_matches('/')
    )
}

fn parse_url(label: &str, raw: &str) -> Result<Url, WarmError> {
    Url::parse(raw).map_err(|source| WarmError::InvalidUrl {
        label: label.to_string(),
        url: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;

    fn urls_of(source: &dyn UrlSource) -> Vec<String> {
        source
            .urls()
            .expect("source collects")
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn entries_skip_unpublished_private_and_redirects() {
        let mut hidden = Entry::new("http://localhost/draft");
        hidden.published = false;
        let mut private = Entry::new("http://localhost/secret");
        private.private = true;
        let mut redirect = Entry::new("http://localhost/moved");
        redirect.redirect = true;

        let source = EntrySource::new(vec![
            Entry::new("http://localhost/"),
            hidden,
            private,
            redirect,
            Entry::new("http://localhost/blog"),
        ]);

        assert_eq!(
            urls_of(&source),
            vec!["http://localhost/", "http://localhost/blog"]
        );
    }

    #[test]
    fn taxonomies_need_a_template_and_fan_out_per_site() {
        let source = TaxonomySource::new(vec![
            Taxonomy {
                handle: "tags".to_string(),
                template_exists: true,
                site_urls: vec![
                    "http://localhost/tags".to_string(),
                    "http://localhost/fr/tags".to_string(),
                ],
            },
            Taxonomy {
                handle: "colors".to_string(),
                template_exists: false,
                site_urls: vec!["http://localhost/colors".to_string()],
            },
        ]);

        assert_eq!(
            urls_of(&source),
            vec!["http://localhost/tags", "http://localhost/fr/tags"]
        );
    }

    #[test]
    fn parameterized_routes_are_skipped() {
        let source = RouteSource::new(
            "http://localhost",
            vec![
                CustomRoute::new("/about"),
                CustomRoute::new("/products/{slug}"),
                CustomRoute::new("contact"),
            ],
        );

        assert_eq!(
            urls_of(&source),
            vec!["http://localhost/about", "http://localhost/contact"]
        );
    }

    #[test]
    fn hooks_contribute_relative_and_absolute_urls() {
        let mut sources = SourceSet::new("http://localhost");
        sources.add_hook(|| vec!["/promo".to_string(), "http://other.test/page".to_string()]);

        let urls = sources.collect(&events::noop()).expect("collect");

        assert_eq!(
            urls.iter().map(Url::as_str).collect::<Vec<_>>(),
            vec!["http://localhost/promo", "http://other.test/page"]
        );
    }

    #[test]
    fn every_stage_reports_start_and_completion() {
        use std::sync::{Arc, Mutex};

        let mut sources = SourceSet::new("http://localhost");
        sources.add_source(EntrySource::new(vec![Entry::new("http://localhost/")]));

        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let on_event: OnEvent = Arc::new(move |event| {
            let line = match event {
                WarmEvent::SourceStarted { label } => format!("start {label}"),
                WarmEvent::SourceCompleted { label, urls } => format!("done {label} {urls}"),
                other => format!("other {other:?}"),
            };
            sink.lock().expect("lock").push(line);
        });

        sources.collect(&on_event).expect("collect");

        assert_eq!(
            *seen.lock().expect("lock"),
            vec![
                "start Entries",
                "done Entries 1",
                "start Additional URLs",
                "done Additional URLs 0",
            ]
        );
    }

    #[test]
    fn invalid_source_urls_name_the_stage() {
        let source = EntrySource::new(vec![Entry::new("not a url")]);

        match source.urls() {
            Err(WarmError::InvalidUrl { label, url, .. }) => {
                assert_eq!(label, "Entries");
                assert_eq!(url, "not a url");
            }
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }
}
