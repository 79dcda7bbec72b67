//! # Warm Requests
//!
//! The unit of work: one HTTP request the warmer replays against the site,
//! plus the outcome of replaying it. Outcomes stay keyed by the request's
//! position in the plan, so reports line up no matter which order the
//! responses arrive in.

use reqwest::Method;
use url::Url;

/// Header telling the site to render the page fresh instead of serving
/// its cached copy.
pub const CACHE_BUSTER_HEADER: &str = "X-Statamic-Cache-Buster";

/// One planned warm request.
#[derive(Debug, Clone)]
pub struct WarmRequest {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
}

impl WarmRequest {
    pub fn new(method: Method, url: Url, headers: Vec<(String, String)>) -> Self {
        Self {
            method,
            url,
            headers,
        }
    }

    /// A GET request carrying the cache-buster header, as the planner
    /// produces them.
    pub fn busting(url: Url) -> Self {
        Self::new(
            Method::GET,
            url,
            vec![(CACHE_BUSTER_HEADER.to_string(), "true".to_string())],
        )
    }

    /// A plain GET request with no extra headers, used for cache probes.
    pub fn bare(url: Url) -> Self {
        Self::new(Method::GET, url, Vec::new())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Header value looked up by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Terminal state of one warm request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmStatus {
    /// The page rendered, carrying the response status code.
    Success(u16),
    /// The page could not be fetched or rendered.
    Failure {
        /// HTTP status, when a response came back at all.
        code: Option<u16>,
        /// Operator-facing description of what went wrong.
        message: String,
    },
}

impl WarmStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Result of replaying one planned request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmOutcome {
    /// Position of the request in the plan.
    pub index: usize,
    /// Site-relative URI, for reporting.
    pub uri: String,
    pub status: WarmStatus,
}

/// Site-relative form of `url`.
///
/// URLs under `base_url` reduce to the remainder after it; anything else
/// falls back to its own path. The query string is kept, and the site
/// root collapses to `/`.
pub fn relative_uri(url: &Url, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');

    let mut uri = match url.as_str().strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => {
            rest.to_string()
        }
        _ => match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        },
    };

    if !uri.starts_with('/') {
        uri.insert(0, '/');
    }

    uri
}
