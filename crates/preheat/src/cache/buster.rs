//! # Cache Buster
//!
//! Wrapper that makes the cache lie about warm requests. A request
//! carrying a truthy cache-buster header is reported as uncached, which
//! forces a fresh render, while the rendered result is still written
//! through to the wrapped cache.

use std::io;

use async_trait::async_trait;

use crate::cache::store::PageCache;
use crate::request::{WarmRequest, CACHE_BUSTER_HEADER};

/// Decorates any [`PageCache`] with cache-buster awareness.
pub struct CacheBuster<C> {
    inner: C,
}

impl<C> CacheBuster<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[async_trait]
impl<C: PageCache> PageCache for CacheBuster<C> {
    async fn has_cached_page(&self, request: &WarmRequest) -> io::Result<bool> {
        if request.header(CACHE_BUSTER_HEADER).is_some_and(is_truthy) {
            return Ok(false);
        }
        self.inner.has_cached_page(request).await
    }

    async fn cache_page(&self, request: &WarmRequest, content: &[u8]) -> io::Result<bool> {
        self.inner.cache_page(request, content).await
    }
}
