//! # Page Cache Contract
//!
//! Trait implemented by anything that can answer "is this page cached?"
//! and persist freshly rendered pages.

use std::io;

use async_trait::async_trait;

use crate::request::WarmRequest;

/// A store of fully rendered pages.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Whether a fresh cached copy of this page exists.
    async fn has_cached_page(&self, request: &WarmRequest) -> io::Result<bool>;

    /// Persists a rendered page. `Ok(false)` means another writer held
    /// the page lock and this write was skipped.
    async fn cache_page(&self, request: &WarmRequest, content: &[u8]) -> io::Result<bool>;
}
