//! # File Cacher
//!
//! Disk-backed page cache. Pages are stored as complete HTML files laid
//! out by host and URL path, which lets a web server serve them without
//! touching the application at all.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::Method;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cache::store::PageCache;
use crate::cache::writer::CacheWriter;
use crate::config::CachePermissions;
use crate::request::WarmRequest;

/// Page cache rooted at a directory on disk.
pub struct FileCacher {
    root: PathBuf,
    writer: CacheWriter,
    lock_hold: Duration,
    expiry: Option<Duration>,
}

impl FileCacher {
    pub fn new(
        root: impl Into<PathBuf>,
        permissions: CachePermissions,
        lock_hold: Duration,
        expiry: Option<Duration>,
    ) -> Self {
        Self {
            root: root.into(),
            writer: CacheWriter::new(permissions),
            lock_hold,
            expiry,
        }
    }

    /// File a page is cached at: `<root>/<host>/<path>.html`, with the
    /// site root stored as `index` and the query string folded into the
    /// name as a short hash.
    ///
    /// Trailing slashes are ignored, so `/blog` and `/blog/` share one
    /// cache entry.
    pub fn page_path(&self, request: &WarmRequest) -> PathBuf {
        let url = request.url();
        let mut path = self.root.clone();

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}-{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => "localhost".to_string(),
        };
        path.push(host);

        let trimmed = url.path().trim_matches('/');
        let page = if trimmed.is_empty() { "index" } else { trimmed };

        let name = match url.query().filter(|query| !query.is_empty()) {
            Some(query) => format!("{page}_{}.html", query_hash(query)),
            None => format!("{page}.html"),
        };
        path.push(name);

        path
    }
}

fn query_hash(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(16);
    hex
}

/// Whether a page written at `modified` still counts as cached.
fn is_fresh(modified: SystemTime, now: SystemTime, expiry: Option<Duration>) -> bool {
    let Some(expiry) = expiry else {
        return true;
    };
    match now.duration_since(modified) {
        Ok(age) => age <= expiry,
        // Mtime in the future means clock skew, not staleness.
        Err(_) => true,
    }
}

#[async_trait]
impl PageCache for FileCacher {
    async fn has_cached_page(&self, request: &WarmRequest) -> io::Result<bool> {
        if request.method() != Method::GET {
            return Ok(false);
        }

        let path = self.page_path(request);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok(is_fresh(metadata.modified()?, SystemTime::now(), self.expiry)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error),
        }
    }

    async fn cache_page(&self, request: &WarmRequest, content: &[u8]) -> io::Result<bool> {
        if request.method() != Method::GET {
            debug!(method = %request.method(), "only GET pages are cached");
            return Ok(false);
        }

        let path = self.page_path(request);
        let writer = self.writer;
        let lock_hold = self.lock_hold;
        let content = content.to_vec();

        tokio::task::spawn_blocking(move || writer.write(&path, &content, lock_hold))
            .await
            .map_err(io::Error::other)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn cacher(root: &std::path::Path) -> FileCacher {
        FileCacher::new(root, CachePermissions::default(), Duration::ZERO, None)
    }

    fn request(raw: &str) -> WarmRequest {
        WarmRequest::busting(Url::parse(raw).expect("test URL"))
    }

    #[test]
    fn root_page_is_stored_as_index() {
        let cacher = cacher(std::path::Path::new("/cache"));

        assert_eq!(
            cacher.page_path(&request("http://example.com/")),
            PathBuf::from("/cache/example.com/index.html")
        );
    }

    #[test]
    fn nested_pages_mirror_the_url_path() {
        let cacher = cacher(std::path::Path::new("/cache"));

        assert_eq!(
            cacher.page_path(&request("http://example.com/blog/post-1")),
            PathBuf::from("/cache/example.com/blog/post-1.html")
        );
    }

    #[test]
    fn trailing_slash_shares_the_cache_entry() {
        let cacher = cacher(std::path::Path::new("/cache"));

        assert_eq!(
            cacher.page_path(&request("http://example.com/blog/")),
            cacher.page_path(&request("http://example.com/blog"))
        );
    }

    #[test]
    fn explicit_ports_get_their_own_host_directory() {
        let cacher = cacher(std::path::Path::new("/cache"));

        assert_eq!(
            cacher.page_path(&request("http://example.com:8080/")),
            PathBuf::from("/cache/example.com-8080/index.html")
        );
    }

    #[test]
    fn query_strings_fork_the_entry() {
        let cacher = cacher(std::path::Path::new("/cache"));

        let plain = cacher.page_path(&request("http://example.com/search"));
        let first = cacher.page_path(&request("http://example.com/search?q=a"));
        let second = cacher.page_path(&request("http://example.com/search?q=b"));

        assert_ne!(plain, first);
        assert_ne!(first, second);
        assert_eq!(first, cacher.page_path(&request("http://example.com/search?q=a")));
    }

    #[test]
    fn freshness_follows_the_expiry_window() {
        let now = SystemTime::now();
        let minute = Duration::from_secs(60);

        assert!(is_fresh(now - minute, now, None));
        assert!(is_fresh(now - minute, now, Some(2 * minute)));
        assert!(!is_fresh(now - 3 * minute, now, Some(2 * minute)));
        assert!(is_fresh(now + minute, now, Some(minute)));
    }

    #[tokio::test]
    async fn cached_pages_are_found_after_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cacher = cacher(dir.path());
        let request = request("http://example.com/blog/post-1");

        assert!(!cacher.has_cached_page(&request).await.expect("probe"));

        let written = cacher
            .cache_page(&request, b"<html>post</html>")
            .await
            .expect("write");
        assert!(written);

        assert!(cacher.has_cached_page(&request).await.expect("probe"));
        let stored = std::fs::read(cacher.page_path(&request)).expect("read back");
        assert_eq!(stored, b"<html>post</html>");
    }

    #[tokio::test]
    async fn non_get_requests_are_never_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cacher = cacher(dir.path());
        let request = WarmRequest::new(
            Method::POST,
            Url::parse("http://example.com/form").expect("test URL"),
            Vec::new(),
        );

        assert!(!cacher.cache_page(&request, b"body").await.expect("skip"));
        assert!(!cacher.has_cached_page(&request).await.expect("probe"));
    }
}
