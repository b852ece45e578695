// src/fetch/fetcher.rs
use std::sync::Arc;

use crate::fetch::cache::PageCache;
use crate::fetch::client::Transport;
use crate::utils::error::FetchError;

/// Cache-first page retrieval.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn PageCache>,
    ttl_minutes: u64,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<dyn PageCache>, ttl_minutes: u64) -> Self {
        Self { transport, cache, ttl_minutes }
    }

    /// Returns the HTML behind `url`, from the cache when fresh.
    ///
    /// On a miss the page is requested once; failures are returned as-is and
    /// nothing is cached for them.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(html) = self.cache.get(url) {
            tracing::debug!("Cache hit for {} ({} bytes)", url, html.len());
            return Ok(html);
        }

        tracing::debug!("Cache miss for {}", url);
        let html = self.transport.get(url).await?;
        self.cache.put(url, html.clone(), self.ttl_minutes);
        Ok(html)
    }

    pub fn ttl_minutes(&self) -> u64 {
        self.ttl_minutes
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::cache::MemoryCache;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves canned pages and counts every request it receives.
    #[derive(Default)]
    pub(crate) struct StubTransport {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StubTransport {
        pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Transport {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            })
        }
    }

    const URL: &str = "http://ontario.example.org/elementary/list.aspx";

    #[tokio::test(start_paused = true)]
    async fn repeated_fetch_within_ttl_hits_transport_once() {
        let transport = Arc::new(StubTransport::default().with_page(URL, "<html>list</html>"));
        let fetcher = PageFetcher::new(transport.clone(), Arc::new(MemoryCache::new()), 30);

        assert_eq!(fetcher.fetch(URL).await.unwrap(), "<html>list</html>");
        tokio::time::advance(Duration::from_secs(29 * 60)).await;
        assert_eq!(fetcher.fetch(URL).await.unwrap(), "<html>list</html>");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_after_expiry_goes_back_to_transport() {
        let transport = Arc::new(StubTransport::default().with_page(URL, "<html>list</html>"));
        let fetcher = PageFetcher::new(transport.clone(), Arc::new(MemoryCache::new()), 30);

        fetcher.fetch(URL).await.unwrap();
        tokio::time::advance(Duration::from_secs(31 * 60)).await;
        fetcher.fetch(URL).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn cached_value_is_returned_unchanged_without_transport() {
        let transport = Arc::new(StubTransport::default());
        let cache = Arc::new(MemoryCache::new());
        cache.put(URL, "  <p>cached</p>\n".to_string(), 10);
        let fetcher = PageFetcher::new(transport.clone(), cache, 10);

        let html = tokio_test::block_on(fetcher.fetch(URL)).unwrap();
        assert_eq!(html, "  <p>cached</p>\n");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn failures_propagate_and_are_not_cached() {
        let transport = Arc::new(StubTransport::default());
        let cache = Arc::new(MemoryCache::new());
        let fetcher = PageFetcher::new(transport.clone(), cache.clone(), 10);

        assert!(matches!(fetcher.fetch(URL).await, Err(FetchError::Transport { .. })));
        assert!(fetcher.fetch(URL).await.is_err());
        assert_eq!(transport.calls(), 2);
        assert!(cache.is_empty());
    }
}
